pub use super::binary_position::Entity as BinaryPosition;
pub use super::client_binding::Entity as ClientBinding;
pub use super::extended_position::Entity as ExtendedPosition;
pub use super::login::Entity as Login;
pub use super::short_position::Entity as ShortPosition;
