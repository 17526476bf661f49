// Composition root for the visits bounded context.
//
// Responsibilities
// - Read config from environment.
// - Instantiate the in-memory or PostgreSQL adapters.
// - Wire them into the scan resolver and the admin use cases.
// - Expose the HTTP router and the GraphQL schema.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;
