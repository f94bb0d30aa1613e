use super::ConnectionFactory;
use tracing::{Level, event};

/// RAII scope for one acquired connection.
///
/// The connection is handed back to its factory when the guard drops, on the
/// success path, the error path and during unwinding alike.
pub struct ConnectionGuard<'a, F: ConnectionFactory> {
    connection: Option<F::Connection>,
    factory: &'a F,
}

impl<'a, F: ConnectionFactory> ConnectionGuard<'a, F> {
    pub fn acquire(factory: &'a F) -> anyhow::Result<Self> {
        let connection = factory.get_connection()?;
        Ok(Self {
            connection: Some(connection),
            factory,
        })
    }

    /// Get a reference to the connection
    pub fn connection(&mut self) -> &mut F::Connection {
        self.connection
            .as_mut()
            .expect("Connection already returned to factory")
    }
}

impl<F: ConnectionFactory> Drop for ConnectionGuard<'_, F> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(err) = self.factory.release(connection) {
                event!(Level::WARN, error = %err, "connection release failed");
            }
        }
    }
}
