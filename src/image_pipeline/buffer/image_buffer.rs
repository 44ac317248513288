//! Chunked pull buffer

use tracing::trace;

use crate::image_pipeline::common::utilities::align_multiple_ceil;

/// Read callback supplied by the transport layer.
///
/// Called with the number of bytes requested and a buffer of exactly that length. Returns
/// `false` on end of data or failure.
pub type ProducerCallback = Box<dyn FnMut(usize, &mut [u8]) -> bool>;

/// Serves reads of any size from a producer that is always asked for at most `size` bytes
/// at a time.
///
/// When a remaining size is set, the total amount requested from the producer never exceeds
/// it, except that the final request may be rounded up to the last read multiple.
pub struct ImageBuffer {
    producer: ProducerCallback,
    size: usize,
    remaining_size: Option<usize>,
    last_read_multiple: Option<usize>,
    buffer_offset: usize,
    curr_size: usize,
    buffer: Vec<u8>,
}

impl ImageBuffer {
    pub fn new<F>(size: usize, producer: F) -> Self
    where
        F: FnMut(usize, &mut [u8]) -> bool + 'static,
    {
        Self {
            producer: Box::new(producer),
            size,
            remaining_size: None,
            last_read_multiple: None,
            buffer_offset: 0,
            curr_size: 0,
            buffer: vec![0; size],
        }
    }

    /// Chunk size requested from the producer
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes already produced but not yet returned by `get_data`
    pub fn available(&self) -> usize {
        self.curr_size - self.buffer_offset
    }

    pub fn remaining_size(&self) -> Option<usize> {
        self.remaining_size
    }

    pub fn set_remaining_size(&mut self, bytes: usize) {
        self.remaining_size = Some(bytes);
    }

    pub fn last_read_multiple(&self) -> Option<usize> {
        self.last_read_multiple
    }

    pub fn set_last_read_multiple(&mut self, multiple: usize) {
        self.last_read_multiple = Some(multiple);
    }

    /// Fills `out` completely. Returns `false` as soon as the producer fails or the
    /// remaining size runs out before `out` is full; `out` is then only partially written.
    pub fn get_data(&mut self, out: &mut [u8]) -> bool {
        let mut out_pos = self.copy_buffer(out, 0);
        if out_pos == out.len() {
            return true;
        }

        let mut got_data = true;
        loop {
            self.buffer_offset = 0;

            let mut size_to_read = self.size;
            if let Some(remaining) = self.remaining_size.as_mut() {
                size_to_read = size_to_read.min(*remaining);
                *remaining -= size_to_read;
            }

            let exhausted = self.remaining_size == Some(0);
            let aligned_size_to_read = match self.last_read_multiple {
                Some(multiple) if exhausted => align_multiple_ceil(size_to_read, multiple),
                _ => size_to_read,
            };
            if aligned_size_to_read > self.buffer.len() {
                self.buffer.resize(aligned_size_to_read, 0);
            }

            trace!(size = aligned_size_to_read, "Requesting data from producer");
            got_data &= (self.producer)(aligned_size_to_read, &mut self.buffer[..aligned_size_to_read]);
            self.curr_size = size_to_read;

            out_pos = self.copy_buffer(out, out_pos);

            if exhausted && out_pos < out.len() {
                got_data = false;
            }
            if out_pos >= out.len() || !got_data {
                break;
            }
        }
        got_data
    }

    fn copy_buffer(&mut self, out: &mut [u8], out_pos: usize) -> usize {
        let bytes_copy = self.available().min(out.len() - out_pos);
        out[out_pos..out_pos + bytes_copy]
            .copy_from_slice(&self.buffer[self.buffer_offset..self.buffer_offset + bytes_copy]);
        self.buffer_offset += bytes_copy;
        out_pos + bytes_copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_buffer(
        chunk_size: usize,
        succeed_while: impl Fn(usize) -> bool + 'static,
    ) -> (ImageBuffer, Rc<RefCell<Vec<usize>>>) {
        let requests = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&requests);
        let buffer = ImageBuffer::new(chunk_size, move |size, data| {
            let mut recorded = recorded.borrow_mut();
            let count = recorded.len();
            recorded.push(size);
            assert_eq!(data.len(), size);
            data.fill(count as u8);
            succeed_while(count)
        });
        (buffer, requests)
    }

    #[test]
    fn test_image_buffer_exact_chunk_reads() {
        let (mut buffer, requests) = recording_buffer(1000, |_| true);
        buffer.set_remaining_size(2500);

        let mut out = vec![0u8; 2500];
        assert!(buffer.get_data(&mut out[..1000]));
        assert!(buffer.get_data(&mut out[1000..2000]));
        assert!(buffer.get_data(&mut out[2000..]));

        assert_eq!(*requests.borrow(), vec![1000, 1000, 500]);
        assert_eq!(out[999], 0);
        assert_eq!(out[1000], 1);
        assert_eq!(out[2499], 2);
    }

    #[test]
    fn test_image_buffer_small_reads() {
        let (mut buffer, requests) = recording_buffer(1000, |_| true);
        buffer.set_remaining_size(2500);

        let mut out = vec![0u8; 2500];
        assert!(buffer.get_data(&mut out[..600]));
        assert!(buffer.get_data(&mut out[600..1200]));
        assert!(buffer.get_data(&mut out[1200..1800]));
        assert!(buffer.get_data(&mut out[1800..]));

        assert_eq!(*requests.borrow(), vec![1000, 1000, 500]);
        assert_eq!(out[1199], 1);
        assert_eq!(buffer.available(), 0);
    }

    #[test]
    fn test_image_buffer_large_read() {
        let (mut buffer, requests) = recording_buffer(1000, |_| true);
        buffer.set_remaining_size(2500);

        let mut out = vec![0u8; 2500];
        assert!(buffer.get_data(&mut out));
        assert_eq!(*requests.borrow(), vec![1000, 1000, 500]);
    }

    #[test]
    fn test_image_buffer_unbounded_until_failure() {
        let (mut buffer, requests) = recording_buffer(1000, |count| count < 3);

        let mut out = vec![0u8; 3000];
        assert!(buffer.get_data(&mut out));
        assert!(!buffer.get_data(&mut out));
        assert_eq!(*requests.borrow(), vec![1000, 1000, 1000, 1000]);
    }

    #[test]
    fn test_image_buffer_last_read_multiple() {
        let (mut buffer, requests) = recording_buffer(1000, |_| true);
        buffer.set_remaining_size(10000);
        buffer.set_last_read_multiple(16);

        let mut out = vec![0u8; 2000];
        assert!(buffer.get_data(&mut out));
        assert!(buffer.get_data(&mut out));

        buffer.set_remaining_size(100);
        let mut out = vec![0u8; 200];
        assert!(!buffer.get_data(&mut out));

        assert_eq!(*requests.borrow(), vec![1000, 1000, 1000, 1000, 112]);
        assert_eq!(buffer.remaining_size(), Some(0));
    }
}
