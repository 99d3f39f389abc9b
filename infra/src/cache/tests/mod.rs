mod redis_client_tests;
mod token_store_tests;
