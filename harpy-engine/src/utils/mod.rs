/// In-memory stand-ins for the raw socket, and frame builders, for exercising the engines
/// without an interface or privileges.
pub mod test;
