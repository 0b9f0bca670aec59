mod api_tests;
mod list_round_trips;
