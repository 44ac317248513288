/// Rounds `x` up to the nearest multiple of `multiple`. A zero multiple leaves `x` unchanged.
pub fn align_multiple_ceil(x: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return x;
    }
    x.div_ceil(multiple) * multiple
}

/// Rounds `x` down to the nearest multiple of `multiple`. A zero multiple leaves `x` unchanged.
pub fn align_multiple_floor(x: usize, multiple: usize) -> usize {
    if multiple == 0 {
        return x;
    }
    (x / multiple) * multiple
}
