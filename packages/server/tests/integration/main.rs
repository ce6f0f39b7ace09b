mod common;

mod auth;
mod reference;
mod shopping_cart;
mod subscriptions;
mod users;
