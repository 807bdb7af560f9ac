use keyforge_snowflake::{Clock, Error, Snowflake, SnowflakeId};
use std::sync::Arc;

/// Trait for allocating primary keys.
///
/// Implementations are pure generators that don't interact with storage.
/// The persistence layer calls [`Generator::generate`] once per inserted
/// record and stores the result as the row's primary key.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<u64>;
    /// Generates a value that converts into a unique primary key.
    fn generate(&self) -> Result<Self::Output, Error>;
}

impl<C: Clock + 'static> Generator for Snowflake<C> {
    type Output = SnowflakeId;

    fn generate(&self) -> Result<Self::Output, Error> {
        self.next_id()
    }
}

/// One generator is built at startup and handed to every caller as a shared
/// handle, so all of them draw from the same sequence state.
impl<G: Generator> Generator for Arc<G> {
    type Output = G::Output;

    fn generate(&self) -> Result<Self::Output, Error> {
        (**self).generate()
    }
}

/// Allocates the next key as the raw integer the database column stores.
pub fn generate_key<G: Generator>(generator: &G) -> Result<u64, Error> {
    generator.generate().map(Into::into)
}
