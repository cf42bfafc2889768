mod availability_test;
mod middleware_test;
mod settings_test;
mod slot_block_test;
mod store_errors_test;
