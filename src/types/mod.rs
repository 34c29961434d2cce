pub mod boundary;
pub mod climate;
pub mod municipality;
pub mod period;
pub mod state;
