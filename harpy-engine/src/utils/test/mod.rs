pub mod memory_transport;
