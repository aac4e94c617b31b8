// Endpoint groups, each an `impl ApiClient` block.

mod cart;
mod children;
mod follows;
mod likes;
mod meetings;
mod users;
