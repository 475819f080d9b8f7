pub mod mode;
pub mod network;
pub mod spec;
pub mod topography;

pub use mode::Mode;
pub use network::Network;
pub use spec::NetworkSpec;
pub use topography::Topography;
