/// Common interface for mutex implementations.
///
/// All channels of one multiplexer share a single mutex which owns the upstream bus.  A channel
/// transaction holds that mutex from the moment its channel is selected until all channels are
/// deselected again, so no other transaction can ever observe a foreign channel on the bus.
/// `tca9548a` already implements this trait for a number of existing mutex types.  Some of them
/// are guarded by a feature that needs to be enabled.  Here is an overview:
///
/// | Mutex | Feature Name | Notes |
/// | --- | --- | --- |
/// | [`core::cell::RefCell`] | _always available_ | For sharing within a single execution context. |
/// | [`std::sync::Mutex`][mutex-std] | `std` | For sharing channels between threads. |
/// | [`critical_section::Mutex`][mutex-cs] | `critical-section` | For sharing with interrupt handlers on bare metal. |
/// | `&M`, [`std::sync::Arc<M>`][arc-std] | `Arc` needs `std` | For several multiplexers on one bus, see below. |
///
/// [mutex-std]: https://doc.rust-lang.org/std/sync/struct.Mutex.html
/// [mutex-cs]: https://docs.rs/critical-section/latest/critical_section/struct.Mutex.html
/// [arc-std]: https://doc.rust-lang.org/std/sync/struct.Arc.html
///
/// For other mutex types, a custom implementation is needed.  Due to the orphan rule, it might be
/// necessary to wrap it in a newtype.  As an example, this is what such a custom implementation
/// might look like:
///
/// ```
/// struct MyMutex<T>(std::sync::Mutex<T>);
///
/// impl<T> tca9548a::BusMutex for MyMutex<T> {
///     type Bus = T;
///
///     fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R {
///         let mut v = self.0.lock().unwrap();
///         f(&mut v)
///     }
/// }
///
/// impl<T> tca9548a::CreateBusMutex for MyMutex<T> {
///     fn create(v: T) -> Self {
///         Self(std::sync::Mutex::new(v))
///     }
/// }
/// ```
///
/// If several multiplexers hang off the same physical bus, they must all be built around one and
/// the same mutex with [`Tca9548a::from_mutex()`](crate::Tca9548a::from_mutex), passing `&mutex`
/// or a clone of an `Arc`.  Giving each multiplexer its own mutex around a shared transport only
/// serializes single transfers, not the whole select, transfer, deselect sequence.  The crate has
/// no way of checking this.
pub trait BusMutex {
    /// The upstream bus that is wrapped inside this mutex.
    type Bus;

    /// Lock the mutex and give a closure access to the bus inside.
    ///
    /// The lock must be released when `f` returns, no matter what it returns.
    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R;
}

/// Mutexes which can be created from the bus they wrap.
pub trait CreateBusMutex: BusMutex {
    /// Create a new mutex of this type.
    fn create(v: Self::Bus) -> Self;
}

impl<T> BusMutex for core::cell::RefCell<T> {
    type Bus = T;

    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R {
        let mut v = self.borrow_mut();
        f(&mut v)
    }
}

impl<T> CreateBusMutex for core::cell::RefCell<T> {
    fn create(v: Self::Bus) -> Self {
        core::cell::RefCell::new(v)
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> BusMutex for std::sync::Mutex<T> {
    type Bus = T;

    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R {
        // A panic inside a transaction leaves at worst a channel selected, which the next
        // transaction overwrites anyway.
        let mut v = self
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut v)
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> CreateBusMutex for std::sync::Mutex<T> {
    fn create(v: Self::Bus) -> Self {
        std::sync::Mutex::new(v)
    }
}

#[cfg(feature = "critical-section")]
impl<T> BusMutex for critical_section::Mutex<core::cell::RefCell<T>> {
    type Bus = T;

    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| {
            let mut v = self.borrow_ref_mut(cs);
            f(&mut v)
        })
    }
}

#[cfg(feature = "critical-section")]
impl<T> CreateBusMutex for critical_section::Mutex<core::cell::RefCell<T>> {
    fn create(v: Self::Bus) -> Self {
        critical_section::Mutex::new(core::cell::RefCell::new(v))
    }
}

impl<M: BusMutex + ?Sized> BusMutex for &M {
    type Bus = M::Bus;

    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R {
        M::lock(self, f)
    }
}

#[cfg(any(test, feature = "std"))]
impl<M: BusMutex + ?Sized> BusMutex for std::sync::Arc<M> {
    type Bus = M::Bus;

    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R {
        M::lock(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{BusMutex, CreateBusMutex};

    #[test]
    fn std_mutex_survives_poisoning() {
        let m: std::sync::Mutex<u8> = CreateBusMutex::create(1);
        let r = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            BusMutex::lock(&m, |v| {
                *v = 2;
                panic!("transport blew up");
            })
        }));
        assert!(r.is_err());
        assert_eq!(BusMutex::lock(&m, |v| *v), 2);
    }

    #[test]
    fn refcell_releases_after_lock() {
        let m: core::cell::RefCell<u8> = CreateBusMutex::create(0);
        BusMutex::lock(&m, |v| *v += 1);
        BusMutex::lock(&m, |v| *v += 1);
        assert_eq!(*m.borrow(), 2);
    }

    #[test]
    fn shared_handles_reach_the_same_bus() {
        let m: std::sync::Mutex<u8> = CreateBusMutex::create(0);
        let a = &m;
        let b = &m;
        BusMutex::lock(&a, |v| *v += 1);
        BusMutex::lock(&b, |v| *v += 1);
        assert_eq!(BusMutex::lock(&m, |v| *v), 2);

        let arc = std::sync::Arc::new(std::sync::Mutex::new(0u8));
        let other = arc.clone();
        BusMutex::lock(&arc, |v| *v = 5);
        assert_eq!(BusMutex::lock(&other, |v| *v), 5);
    }

    #[cfg(feature = "critical-section")]
    #[test]
    fn critical_section_mutex() {
        let m: critical_section::Mutex<core::cell::RefCell<u8>> = CreateBusMutex::create(7);
        assert_eq!(BusMutex::lock(&m, |v| core::mem::replace(v, 8)), 7);
        assert_eq!(BusMutex::lock(&m, |v| *v), 8);
    }
}
