use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// GPU objects that can be released eagerly when their last owner goes away.
///
/// wgpu frees memory on drop as well; `release` lets buffers and textures
/// give their allocation back immediately instead of waiting for the
/// backend's deferred cleanup.
pub trait GpuRelease {
    fn release(&self);
}

impl GpuRelease for wgpu::Buffer {
    fn release(&self) {
        self.destroy();
    }
}

impl GpuRelease for wgpu::Texture {
    fn release(&self) {
        self.destroy();
    }
}

impl GpuRelease for wgpu::RenderPipeline {
    fn release(&self) {}
}

impl GpuRelease for wgpu::Sampler {
    fn release(&self) {}
}

struct Owned<T: GpuRelease> {
    label: String,
    value: T,
}

impl<T: GpuRelease> Drop for Owned<T> {
    fn drop(&mut self) {
        log::trace!("releasing gpu resource '{}'", self.label);
        self.value.release();
    }
}

/// Reference-counted owner of a GPU object.
///
/// Clones share the object; the object is released exactly once, when the
/// last clone is dropped (scope exit, `Vec::clear`, map removal, ...).
pub struct GpuHandle<T: GpuRelease> {
    inner: Arc<Owned<T>>,
}

impl<T: GpuRelease> GpuHandle<T> {
    pub fn new(label: impl Into<String>, value: T) -> Self {
        Self {
            inner: Arc::new(Owned {
                label: label.into(),
                value,
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Number of live handles sharing this object.
    pub fn owners(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// True when both handles refer to the same GPU object.
    pub fn same_object(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: GpuRelease> Clone for GpuHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: GpuRelease> Deref for GpuHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner.value
    }
}

impl<T: GpuRelease> fmt::Debug for GpuHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuHandle")
            .field("label", &self.inner.label)
            .field("owners", &self.owners())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counted(Arc<AtomicUsize>);

    impl GpuRelease for Counted {
        fn release(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counted() -> (Arc<AtomicUsize>, GpuHandle<Counted>) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = GpuHandle::new("scratch", Counted(count.clone()));
        (count, handle)
    }

    #[test]
    fn released_on_scope_exit() {
        let (count, handle) = counted();
        drop(handle);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn shared_object_released_once_by_last_owner() {
        let (count, a) = counted();
        let b = a.clone();
        assert_eq!(a.owners(), 2);
        assert!(a.same_object(&b));

        drop(a);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        drop(b);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn container_clear_releases_members() {
        let (count_a, a) = counted();
        let (count_b, b) = counted();
        let mut v = vec![a, b];
        v.clear();
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn label_is_kept() {
        let (_, h) = counted();
        assert_eq!(h.label(), "scratch");
    }
}
