//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod coil_command;
mod coil_query;
mod coil_repository;

pub use coil_command::{CoilCommand, CreateCoilRequest, FIXTURE_COIL_ID, FixtureCoilCommand};
pub use coil_query::{CoilQuery, FixtureCoilQuery};
#[cfg(test)]
pub use coil_repository::MockCoilRepository;
pub use coil_repository::{CoilRepository, CoilRepositoryError};
