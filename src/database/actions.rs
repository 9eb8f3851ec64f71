pub mod ingredients;
pub mod memberships;
pub mod recipes;
pub mod shopping;
pub mod tags;
pub mod users;
