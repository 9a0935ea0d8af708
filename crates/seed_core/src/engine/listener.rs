use crate::EntityRef;

/// Observer notified once per entity, after it is fully constructed and
/// registered.
///
/// An error aborts the build that created the entity.
pub trait EntityCreatedListener {
    fn entity_created(&mut self, entity: &EntityRef) -> anyhow::Result<()>;
}

impl<F> EntityCreatedListener for F
where
    F: FnMut(&EntityRef),
{
    fn entity_created(&mut self, entity: &EntityRef) -> anyhow::Result<()> {
        self(entity);
        Ok(())
    }
}

/// Listeners in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    listeners: Vec<Box<dyn EntityCreatedListener>>,
}

impl Listeners {
    pub fn push(&mut self, listener: Box<dyn EntityCreatedListener>) {
        self.listeners.push(listener);
    }

    /// Notify every listener in order, stopping at the first failure.
    pub fn notify(&mut self, entity: &EntityRef) -> anyhow::Result<()> {
        for listener in &mut self.listeners {
            listener.entity_created(entity)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
