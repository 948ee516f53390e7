use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Host value the model does not look inside (callbacks, timestamps, handles).
///
/// Two opaque values are equal only when they are the same allocation.
/// The payload must be `Send + Sync` like the rest of the graph.
#[derive(Clone)]
pub struct Opaque(Arc<dyn Any + Send + Sync>);

impl Opaque {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn ptr_eq(a: &Opaque, b: &Opaque) -> bool {
        a.as_ptr() == b.as_ptr()
    }

    // Thin address; vtable pointers are not stable across codegen units.
    pub fn as_ptr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<opaque {:p}>", self.as_ptr())
    }
}
