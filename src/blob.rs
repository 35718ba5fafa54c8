//! Raw memory buffers which either own their allocation or borrow memory
//! owned elsewhere.

use std::alloc::Layout;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::device::Device;
use crate::errors::{Error, Result};

/// Alignment of buffers allocated by [`Blob::allocate`].
pub const BLOB_ALIGN: usize = 64;

/// Function which frees the memory of a [`Blob`], given its base pointer and
/// length in bytes.
pub type Deallocator = Box<dyn FnOnce(NonNull<u8>, usize) + Send>;

enum Ownership {
    /// Memory is freed by calling the deallocator when the blob is dropped.
    Owned(Deallocator),
    Borrowed,
}

/// Contiguous range of bytes used as tensor storage.
///
/// A blob either owns its memory, freeing it on drop, or borrows memory that
/// outlives `'a`. Borrowed blobs are created as views into another blob or
/// from existing slices. Owning blobs cannot be cloned, only deep copied with
/// [`copy`](Blob::copy).
///
/// Writes go through [`as_bytes_mut`](Blob::as_bytes_mut), which fails for
/// read-only blobs. A blob is read-only if it was created from a shared
/// reference, including views created by [`view`](Blob::view).
pub struct Blob<'a> {
    ptr: NonNull<u8>,
    len: usize,
    device: Device,
    ownership: Ownership,
    writable: bool,
    _marker: PhantomData<&'a mut [u8]>,
}

// Safety: A blob grants access to its bytes only through `&self` (shared,
// read-only) and `&mut self` (exclusive) methods, so it follows the same rules
// as `&mut [u8]`. The deallocator is `Send` and is only called from `drop`.
unsafe impl Send for Blob<'_> {}
unsafe impl Sync for Blob<'_> {}

/// Return a non-null pointer for empty blobs, aligned for every element type.
fn dangling() -> NonNull<u8> {
    NonNull::<u64>::dangling().cast()
}

impl Blob<'static> {
    /// Return an empty blob which does not own any memory.
    pub fn empty() -> Blob<'static> {
        Blob {
            ptr: dangling(),
            len: 0,
            device: Device::Cpu,
            ownership: Ownership::Borrowed,
            writable: true,
            _marker: PhantomData,
        }
    }

    /// Allocate a zero-initialized CPU buffer of `size` bytes.
    ///
    /// The buffer is aligned to [`BLOB_ALIGN`] bytes. Fails with `OutOfMemory`
    /// if the allocation fails.
    pub fn allocate(size: usize) -> Result<Blob<'static>> {
        if size == 0 {
            return Ok(Blob::empty());
        }
        let layout = Layout::from_size_align(size, BLOB_ALIGN)
            .map_err(|_| Error::out_of_memory(format!("cannot allocate {} bytes", size)))?;

        // Safety: `layout` has a non-zero size.
        let ptr = unsafe { std::alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr)
            .ok_or_else(|| Error::out_of_memory(format!("failed to allocate {} bytes", size)))?;

        let dealloc: Deallocator = Box::new(move |ptr: NonNull<u8>, _len: usize| {
            // Safety: `ptr` was allocated above with `layout`.
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
        });

        Ok(Blob {
            ptr,
            len: size,
            device: Device::Cpu,
            ownership: Ownership::Owned(dealloc),
            writable: true,
            _marker: PhantomData,
        })
    }
}

impl<'a> Blob<'a> {
    /// Wrap memory which was allocated elsewhere.
    ///
    /// If `dealloc` is provided the blob takes ownership of the memory and
    /// calls `dealloc` when dropped. Otherwise the blob borrows the memory.
    /// A null `ptr` produces an empty blob.
    ///
    /// # Safety
    ///
    /// For CPU devices `ptr` must be valid for reads and writes of `len` bytes
    /// for the lifetime `'a`, and must not be accessed through other pointers
    /// while the blob or tensors using it are alive. Pointers for other
    /// devices are never dereferenced.
    pub unsafe fn from_raw_parts(
        ptr: *mut u8,
        len: usize,
        device: Device,
        dealloc: Option<Deallocator>,
    ) -> Blob<'a> {
        match NonNull::new(ptr) {
            Some(ptr) => Blob {
                ptr,
                len,
                device,
                ownership: dealloc.map_or(Ownership::Borrowed, Ownership::Owned),
                writable: true,
                _marker: PhantomData,
            },
            None => Blob {
                ptr: dangling(),
                len: 0,
                device,
                ownership: Ownership::Borrowed,
                writable: true,
                _marker: PhantomData,
            },
        }
    }

    /// Create a writable blob which borrows `bytes`.
    pub fn from_bytes_mut(bytes: &'a mut [u8]) -> Blob<'a> {
        Blob {
            // Safety: Slice pointers are never null.
            ptr: unsafe { NonNull::new_unchecked(bytes.as_mut_ptr()) },
            len: bytes.len(),
            device: Device::Cpu,
            ownership: Ownership::Borrowed,
            writable: true,
            _marker: PhantomData,
        }
    }

    /// Create a read-only blob which borrows `bytes`.
    pub fn from_bytes(bytes: &'a [u8]) -> Blob<'a> {
        Blob {
            // Safety: Slice pointers are never null. The blob is marked
            // read-only so the pointer is never written through.
            ptr: unsafe { NonNull::new_unchecked(bytes.as_ptr() as *mut u8) },
            len: bytes.len(),
            device: Device::Cpu,
            ownership: Ownership::Borrowed,
            writable: false,
            _marker: PhantomData,
        }
    }

    /// Return the length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Return true if this blob frees its memory when dropped.
    pub fn is_owner(&self) -> bool {
        matches!(self.ownership, Ownership::Owned(_))
    }

    /// Return true if the bytes of this blob can be modified.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Return the base address of the buffer.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    fn check_cpu(&self) -> Result<()> {
        if !self.device.is_cpu() {
            return Err(Error::not_implemented(format!(
                "data access on device {} is not supported",
                self.device
            )));
        }
        Ok(())
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        self.check_cpu()?;
        // Safety: CPU blobs are valid for reads of `len` bytes, and no
        // mutable access can exist while `self` is borrowed.
        Ok(unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) })
    }

    /// Return the bytes of this blob for writing.
    ///
    /// Fails with `InvalidOperation` for read-only blobs.
    pub fn as_bytes_mut(&mut self) -> Result<&mut [u8]> {
        self.check_cpu()?;
        if !self.writable {
            return Err(Error::invalid_operation("blob is read-only"));
        }
        // Safety: Writable CPU blobs are valid for reads and writes of `len`
        // bytes and `self` is borrowed exclusively.
        Ok(unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) })
    }

    fn borrowed_at(&self, offset: usize, writable: bool) -> Result<Blob<'_>> {
        if offset > self.len {
            return Err(Error::out_of_range(format!(
                "offset {} is beyond blob of {} bytes",
                offset, self.len
            )));
        }
        Ok(Blob {
            // Safety: `offset <= len`, so the result is in bounds or one past
            // the end of the allocation.
            ptr: unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(offset)) },
            len: self.len - offset,
            device: self.device,
            ownership: Ownership::Borrowed,
            writable,
            _marker: PhantomData,
        })
    }

    /// Return a read-only blob which borrows all of this one's memory.
    pub fn as_view(&self) -> Blob<'_> {
        Blob {
            ptr: self.ptr,
            len: self.len,
            device: self.device,
            ownership: Ownership::Borrowed,
            writable: false,
            _marker: PhantomData,
        }
    }

    /// Return a read-only blob which borrows this one's memory starting at
    /// `offset` bytes.
    pub fn view(&self, offset: usize) -> Result<Blob<'_>> {
        self.borrowed_at(offset, false)
    }

    /// Return a writable blob which borrows this one's memory starting at
    /// `offset` bytes.
    pub fn view_mut(&mut self, offset: usize) -> Result<Blob<'_>> {
        if !self.writable {
            return Err(Error::invalid_operation("blob is read-only"));
        }
        self.borrowed_at(offset, true)
    }

    /// Return a blob sharing this blob's memory.
    ///
    /// Fails with `InvalidOperation` if this blob owns its memory, since
    /// sharing would leave the clone dangling once the owner is dropped. Use
    /// [`copy`](Blob::copy) to duplicate owned memory.
    pub fn try_clone(&self) -> Result<Blob<'_>> {
        if self.is_owner() {
            return Err(Error::invalid_operation(
                "cannot clone a blob which owns its memory",
            ));
        }
        Ok(self.as_view())
    }

    /// Copy the first `size` bytes of this blob into a new allocation.
    pub fn copy(&self, size: usize) -> Result<Blob<'static>> {
        if size > self.len {
            return Err(Error::out_of_range(format!(
                "cannot copy {} bytes from blob of {} bytes",
                size, self.len
            )));
        }
        let src = self.as_bytes()?;
        let mut blob = Blob::allocate(size)?;
        blob.as_bytes_mut()?.copy_from_slice(&src[..size]);
        Ok(blob)
    }
}

impl Default for Blob<'_> {
    fn default() -> Self {
        Blob::empty()
    }
}

impl Drop for Blob<'_> {
    fn drop(&mut self) {
        if let Ownership::Owned(dealloc) = std::mem::replace(&mut self.ownership, Ownership::Borrowed)
        {
            dealloc(self.ptr, self.len);
        }
    }
}

impl fmt::Debug for Blob<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("ptr", &self.ptr)
            .field("len", &self.len)
            .field("device", &self.device)
            .field("owner", &self.is_owner())
            .field("writable", &self.writable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::{Blob, BLOB_ALIGN};
    use crate::{Device, ErrorKind};

    #[test]
    fn test_allocate() {
        let mut blob = Blob::allocate(100).unwrap();
        assert_eq!(blob.len(), 100);
        assert!(blob.is_owner());
        assert!(blob.is_writable());
        assert_eq!(blob.device(), Device::Cpu);
        assert_eq!(blob.as_ptr() as usize % BLOB_ALIGN, 0);
        assert!(blob.as_bytes().unwrap().iter().all(|&b| b == 0));

        blob.as_bytes_mut().unwrap()[99] = 7;
        assert_eq!(blob.as_bytes().unwrap()[99], 7);
    }

    #[test]
    fn test_allocate_zero() {
        let blob = Blob::allocate(0).unwrap();
        assert!(blob.is_empty());
        assert!(!blob.is_owner());
        assert_eq!(blob.as_bytes().unwrap(), &[] as &[u8]);
    }

    #[test]
    fn test_allocate_too_large() {
        let err = Blob::allocate(usize::MAX).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfMemory);
    }

    #[test]
    fn test_view() {
        let mut blob = Blob::allocate(8).unwrap();
        blob.as_bytes_mut()
            .unwrap()
            .copy_from_slice(&[0, 1, 2, 3, 4, 5, 6, 7]);

        {
            let mut view = blob.view_mut(3).unwrap();
            assert!(!view.is_owner());
            assert_eq!(view.len(), 5);
            view.as_bytes_mut().unwrap()[0] = 30;
        }
        assert_eq!(blob.as_bytes().unwrap()[3], 30);

        let mut view = blob.view(8).unwrap();
        assert!(view.is_empty());
        assert_eq!(
            view.as_bytes_mut().unwrap_err().kind(),
            ErrorKind::InvalidOperation
        );
        assert_eq!(blob.view(9).unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_read_only_view_cannot_create_writable_view() {
        let blob = Blob::allocate(8).unwrap();
        let mut view = blob.view(0).unwrap();
        assert_eq!(
            view.view_mut(0).unwrap_err().kind(),
            ErrorKind::InvalidOperation
        );
    }

    #[test]
    fn test_try_clone() {
        let blob = Blob::allocate(4).unwrap();
        assert_eq!(
            blob.try_clone().unwrap_err().kind(),
            ErrorKind::InvalidOperation
        );

        let view = blob.view(1).unwrap();
        let clone = view.try_clone().unwrap();
        assert_eq!(clone.as_ptr(), view.as_ptr());
        assert_eq!(clone.len(), 3);
        assert!(!clone.is_owner());
    }

    #[test]
    fn test_copy() {
        let mut data = [1u8, 2, 3, 4];
        let blob = Blob::from_bytes_mut(&mut data);
        let copy = blob.copy(3).unwrap();
        assert!(copy.is_owner());
        assert_ne!(copy.as_ptr(), blob.as_ptr());
        assert_eq!(copy.as_bytes().unwrap(), &[1, 2, 3]);
        assert_eq!(blob.copy(5).unwrap_err().kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_from_raw_parts_calls_deallocator_once() {
        let freed = Arc::new(AtomicUsize::new(0));
        let data = Box::into_raw(vec![5u8; 16].into_boxed_slice());
        let ptr = data as *mut u8;

        {
            let freed_in_dealloc = freed.clone();
            // Safety: `ptr` points to a 16 byte boxed slice which the blob
            // takes ownership of.
            let blob = unsafe {
                Blob::from_raw_parts(
                    ptr,
                    16,
                    Device::Cpu,
                    Some(Box::new(move |ptr: std::ptr::NonNull<u8>, len: usize| {
                        freed_in_dealloc.fetch_add(1, Ordering::SeqCst);
                        let slice = std::ptr::slice_from_raw_parts_mut(ptr.as_ptr(), len);
                        drop(Box::from_raw(slice));
                    })),
                )
            };
            assert!(blob.is_owner());
            assert_eq!(blob.as_bytes().unwrap()[15], 5);

            // Moving the blob transfers ownership without freeing.
            let moved = blob;
            assert_eq!(freed.load(Ordering::SeqCst), 0);
            drop(moved);
        }
        assert_eq!(freed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_foreign_device_data_not_accessible() {
        // Safety: Pointers for non-CPU devices are never dereferenced.
        let mut blob = unsafe { Blob::from_raw_parts(0x1000 as *mut u8, 64, Device::Cuda(0), None) };
        assert_eq!(blob.device(), Device::Cuda(0));
        assert_eq!(blob.as_bytes().unwrap_err().kind(), ErrorKind::NotImplemented);
        assert_eq!(
            blob.as_bytes_mut().unwrap_err().kind(),
            ErrorKind::NotImplemented
        );
        assert_eq!(blob.copy(4).unwrap_err().kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_null_pointer_is_empty() {
        // Safety: A null pointer produces an empty blob.
        let blob = unsafe { Blob::from_raw_parts(std::ptr::null_mut(), 32, Device::Cpu, None) };
        assert!(blob.is_empty());
    }
}
