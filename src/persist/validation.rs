/// Checks an entity before it is written.
///
/// Returns every violated rule; an empty `Err` is treated as a failure too.
pub trait Validator<T>: Send + Sync {
    fn validate(&self, entity: &T) -> Result<(), Vec<String>>;
}

impl<T, F> Validator<T> for F
where
    F: Fn(&T) -> Result<(), Vec<String>> + Send + Sync,
{
    fn validate(&self, entity: &T) -> Result<(), Vec<String>> {
        self(entity)
    }
}
