mod create;
mod delete;
mod get;
mod update;

pub use create::create_user;
pub use delete::delete_user;
pub use get::get_users;
pub use update::update_users;
