//! End-to-end tests of the notification pipeline over in-memory stores.

mod fanout_test;
mod helpers;
mod pipeline_test;
mod registry_test;
