//! Double-ended queue of fixed-width rows

/// A ring buffer of rows that can grow and shrink at both ends.
///
/// Row 0 is always the current front. Popping a row never moves the others and popped
/// storage is reused by later pushes.
#[derive(Debug, Clone)]
pub struct RowBuffer {
    row_bytes: usize,
    first: usize,
    height: usize,
    capacity: usize,
    data: Vec<u8>,
}

impl RowBuffer {
    pub fn new(row_bytes: usize) -> Self {
        Self {
            row_bytes,
            first: 0,
            height: 0,
            capacity: 0,
            data: Vec::new(),
        }
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn empty(&self) -> bool {
        self.height == 0
    }

    pub fn height_capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the rows occupy a single contiguous range of the storage
    pub fn is_linear(&self) -> bool {
        self.first + self.height <= self.capacity
    }

    pub fn clear(&mut self) {
        self.first = 0;
        self.height = 0;
    }

    /// Appends a row at the back. Its content is whatever the reused storage held.
    pub fn push_back(&mut self) {
        self.ensure_capacity();
        self.height += 1;
    }

    /// Prepends a row at the front. Its content is whatever the reused storage held.
    pub fn push_front(&mut self) {
        self.ensure_capacity();
        self.first = if self.first == 0 { self.capacity - 1 } else { self.first - 1 };
        self.height += 1;
    }

    pub fn pop_front(&mut self) {
        assert!(!self.empty(), "pop_front on an empty RowBuffer");
        self.first = (self.first + 1) % self.capacity;
        self.height -= 1;
    }

    pub fn pop_back(&mut self) {
        assert!(!self.empty(), "pop_back on an empty RowBuffer");
        self.height -= 1;
    }

    pub fn get_row(&self, y: usize) -> &[u8] {
        let offset = self.row_offset(y);
        &self.data[offset..offset + self.row_bytes]
    }

    pub fn get_row_ptr(&mut self, y: usize) -> &mut [u8] {
        let offset = self.row_offset(y);
        &mut self.data[offset..offset + self.row_bytes]
    }

    pub fn get_front_row_ptr(&mut self) -> &mut [u8] {
        self.get_row_ptr(0)
    }

    pub fn get_back_row_ptr(&mut self) -> &mut [u8] {
        assert!(!self.empty(), "get_back_row_ptr on an empty RowBuffer");
        self.get_row_ptr(self.height - 1)
    }

    /// Rotates the storage so that row 0 sits at the start
    pub fn linearize(&mut self) {
        if self.first == 0 {
            return;
        }
        let used = self.capacity * self.row_bytes;
        self.data[..used].rotate_left(self.first * self.row_bytes);
        self.first = 0;
    }

    /// All rows as one contiguous slice, front row first
    pub fn linear_rows(&mut self) -> &[u8] {
        self.linearize();
        &self.data[..self.height * self.row_bytes]
    }

    fn row_offset(&self, y: usize) -> usize {
        assert!(
            y < self.height,
            "row {} out of range for RowBuffer of height {}",
            y,
            self.height
        );
        ((self.first + y) % self.capacity) * self.row_bytes
    }

    fn ensure_capacity(&mut self) {
        if self.height < self.capacity {
            return;
        }
        let new_capacity = (self.capacity * 2).max(1);
        self.linearize();
        self.data.resize(new_capacity * self.row_bytes, 0);
        self.capacity = new_capacity;
    }
}
