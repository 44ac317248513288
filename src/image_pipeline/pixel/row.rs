//! Row codec
//!
//! All offset arithmetic for packed rows lives here. Pixel `x` of a row starts at bit
//! `x * bits_per_pixel`; 1-bit samples are addressed most-significant-bit first.

use super::format::PixelFormat;
use super::types::{Pixel, RawPixel};

fn read_bit(data: &[u8], x: usize) -> u8 {
    (data[x / 8] >> (7 - (x % 8))) & 0x1
}

fn write_bit(data: &mut [u8], x: usize, value: u8) {
    let mask = 1u8 << (7 - (x % 8));
    if value & 0x1 != 0 {
        data[x / 8] |= mask;
    } else {
        data[x / 8] &= !mask;
    }
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn write_u16_le(data: &mut [u8], offset: usize, value: u16) {
    data[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

fn widen_bit(bit: u8) -> u16 {
    if bit != 0 { 0xffff } else { 0 }
}

fn widen_8(value: u8) -> u16 {
    let value = value as u16;
    value | (value << 8)
}

fn narrow_bit(value: u16) -> u8 {
    if value & 0x8000 != 0 { 1 } else { 0 }
}

fn gray_value(pixel: Pixel) -> u16 {
    let sum = pixel.r as u32 * 30 + pixel.g as u32 * 59 + pixel.b as u32 * 11;
    (sum / 100) as u16
}

pub fn get_pixel_from_row(data: &[u8], x: usize, format: PixelFormat) -> Pixel {
    match format {
        PixelFormat::I1 => Pixel::gray(widen_bit(read_bit(data, x))),
        PixelFormat::Rgb111 => {
            let bit = x * 3;
            Pixel::new(
                widen_bit(read_bit(data, bit)),
                widen_bit(read_bit(data, bit + 1)),
                widen_bit(read_bit(data, bit + 2)),
            )
        }
        PixelFormat::I8 => Pixel::gray(widen_8(data[x])),
        PixelFormat::Rgb888 => {
            let off = x * 3;
            Pixel::new(widen_8(data[off]), widen_8(data[off + 1]), widen_8(data[off + 2]))
        }
        PixelFormat::Bgr888 => {
            let off = x * 3;
            Pixel::new(widen_8(data[off + 2]), widen_8(data[off + 1]), widen_8(data[off]))
        }
        PixelFormat::I16 => Pixel::gray(read_u16_le(data, x * 2)),
        PixelFormat::Rgb161616 => {
            let off = x * 6;
            Pixel::new(
                read_u16_le(data, off),
                read_u16_le(data, off + 2),
                read_u16_le(data, off + 4),
            )
        }
        PixelFormat::Bgr161616 => {
            let off = x * 6;
            Pixel::new(
                read_u16_le(data, off + 4),
                read_u16_le(data, off + 2),
                read_u16_le(data, off),
            )
        }
    }
}

/// Stores `pixel` at column `x`. Gray formats store a weighted mix of the three channels.
pub fn set_pixel_to_row(data: &mut [u8], x: usize, pixel: Pixel, format: PixelFormat) {
    match format {
        PixelFormat::I1 => write_bit(data, x, narrow_bit(pixel.r)),
        PixelFormat::Rgb111 => {
            let bit = x * 3;
            write_bit(data, bit, narrow_bit(pixel.r));
            write_bit(data, bit + 1, narrow_bit(pixel.g));
            write_bit(data, bit + 2, narrow_bit(pixel.b));
        }
        PixelFormat::I8 => data[x] = (gray_value(pixel) >> 8) as u8,
        PixelFormat::Rgb888 => {
            let off = x * 3;
            data[off] = (pixel.r >> 8) as u8;
            data[off + 1] = (pixel.g >> 8) as u8;
            data[off + 2] = (pixel.b >> 8) as u8;
        }
        PixelFormat::Bgr888 => {
            let off = x * 3;
            data[off] = (pixel.b >> 8) as u8;
            data[off + 1] = (pixel.g >> 8) as u8;
            data[off + 2] = (pixel.r >> 8) as u8;
        }
        PixelFormat::I16 => write_u16_le(data, x * 2, gray_value(pixel)),
        PixelFormat::Rgb161616 => {
            let off = x * 6;
            write_u16_le(data, off, pixel.r);
            write_u16_le(data, off + 2, pixel.g);
            write_u16_le(data, off + 4, pixel.b);
        }
        PixelFormat::Bgr161616 => {
            let off = x * 6;
            write_u16_le(data, off, pixel.b);
            write_u16_le(data, off + 2, pixel.g);
            write_u16_le(data, off + 4, pixel.r);
        }
    }
}

fn raw_byte_range(x: usize, format: PixelFormat) -> std::ops::Range<usize> {
    let bytes = format.bits_per_pixel() / 8;
    x * bytes..(x + 1) * bytes
}

pub fn get_raw_pixel_from_row(data: &[u8], x: usize, format: PixelFormat) -> RawPixel {
    match format {
        PixelFormat::I1 => RawPixel::new(&[read_bit(data, x)]),
        PixelFormat::Rgb111 => {
            let bit = x * 3;
            let packed = (read_bit(data, bit) << 2)
                | (read_bit(data, bit + 1) << 1)
                | read_bit(data, bit + 2);
            RawPixel::new(&[packed])
        }
        _ => RawPixel::new(&data[raw_byte_range(x, format)]),
    }
}

pub fn set_raw_pixel_to_row(data: &mut [u8], x: usize, pixel: RawPixel, format: PixelFormat) {
    match format {
        PixelFormat::I1 => write_bit(data, x, pixel.data[0]),
        PixelFormat::Rgb111 => {
            let bit = x * 3;
            write_bit(data, bit, pixel.data[0] >> 2);
            write_bit(data, bit + 1, pixel.data[0] >> 1);
            write_bit(data, bit + 2, pixel.data[0]);
        }
        _ => {
            let range = raw_byte_range(x, format);
            let len = range.len();
            data[range].copy_from_slice(&pixel.data[..len]);
        }
    }
}

/// Reads one channel of pixel `x` without widening.
///
/// `channel` counts channels in storage order, so channel 0 of a BGR format is blue.
/// Single-channel formats ignore `channel`.
pub fn get_raw_channel_from_row(data: &[u8], x: usize, channel: usize, format: PixelFormat) -> u16 {
    match format {
        PixelFormat::I1 => read_bit(data, x) as u16,
        PixelFormat::Rgb111 => read_bit(data, x * 3 + channel) as u16,
        PixelFormat::I8 => data[x] as u16,
        PixelFormat::Rgb888 | PixelFormat::Bgr888 => data[x * 3 + channel] as u16,
        PixelFormat::I16 => read_u16_le(data, x * 2),
        PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => read_u16_le(data, x * 6 + channel * 2),
    }
}

/// Writes one channel of pixel `x`. Values wider than the format depth are truncated.
pub fn set_raw_channel_to_row(
    data: &mut [u8],
    x: usize,
    channel: usize,
    value: u16,
    format: PixelFormat,
) {
    match format {
        PixelFormat::I1 => write_bit(data, x, (value & 0x1) as u8),
        PixelFormat::Rgb111 => write_bit(data, x * 3 + channel, (value & 0x1) as u8),
        PixelFormat::I8 => data[x] = value as u8,
        PixelFormat::Rgb888 | PixelFormat::Bgr888 => data[x * 3 + channel] = value as u8,
        PixelFormat::I16 => write_u16_le(data, x * 2, value),
        PixelFormat::Rgb161616 | PixelFormat::Bgr161616 => {
            write_u16_le(data, x * 6 + channel * 2, value)
        }
    }
}

/// Converts `count` pixels from `in_format` to `out_format`
pub fn convert_pixel_row_format(
    in_data: &[u8],
    in_format: PixelFormat,
    out_data: &mut [u8],
    out_format: PixelFormat,
    count: usize,
) {
    if in_format == out_format {
        let bytes = in_format.row_bytes(count);
        out_data[..bytes].copy_from_slice(&in_data[..bytes]);
        return;
    }

    for x in 0..count {
        let pixel = get_pixel_from_row(in_data, x, in_format);
        set_pixel_to_row(out_data, x, pixel, out_format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FORMATS: [PixelFormat; 8] = [
        PixelFormat::I1,
        PixelFormat::Rgb111,
        PixelFormat::I8,
        PixelFormat::Rgb888,
        PixelFormat::Bgr888,
        PixelFormat::I16,
        PixelFormat::Rgb161616,
        PixelFormat::Bgr161616,
    ];

    fn narrow(pixel: Pixel, format: PixelFormat) -> Pixel {
        let f = |v: u16| match format.depth() {
            1 => widen_bit(narrow_bit(v)),
            8 => widen_8((v >> 8) as u8),
            _ => v,
        };
        Pixel::new(f(pixel.r), f(pixel.g), f(pixel.b))
    }

    #[test]
    fn test_pixel_round_trip_all_formats() {
        let color = Pixel::new(0x1234, 0x8765, 0xfedc);
        let gray = Pixel::gray(0x9abc);

        for format in ALL_FORMATS {
            let pixel = if format.channels() == 1 { gray } else { color };
            let mut row = vec![0u8; format.row_bytes(5)];
            set_pixel_to_row(&mut row, 3, pixel, format);
            assert_eq!(get_pixel_from_row(&row, 3, format), narrow(pixel, format), "{:?}", format);
            assert_eq!(get_pixel_from_row(&row, 2, format), Pixel::gray(0), "{:?}", format);
        }
    }

    #[test]
    fn test_bit_packing_msb_first() {
        let row = [0b1010_0000u8, 0b0000_0001];
        assert_eq!(get_pixel_from_row(&row, 0, PixelFormat::I1), Pixel::gray(0xffff));
        assert_eq!(get_pixel_from_row(&row, 1, PixelFormat::I1), Pixel::gray(0));
        assert_eq!(get_pixel_from_row(&row, 2, PixelFormat::I1), Pixel::gray(0xffff));
        assert_eq!(get_pixel_from_row(&row, 15, PixelFormat::I1), Pixel::gray(0xffff));

        // pixel 1 occupies bits 3..6
        let row = [0b0001_0100u8];
        assert_eq!(
            get_pixel_from_row(&row, 1, PixelFormat::Rgb111),
            Pixel::new(0xffff, 0, 0xffff)
        );
        assert_eq!(get_raw_pixel_from_row(&row, 1, PixelFormat::Rgb111).data[0], 0b101);
    }

    #[test]
    fn test_widening() {
        let row = [0x12u8, 0x34, 0x56];
        assert_eq!(get_pixel_from_row(&row, 0, PixelFormat::Rgb888), Pixel::new(0x1212, 0x3434, 0x5656));
        assert_eq!(get_pixel_from_row(&row, 0, PixelFormat::Bgr888), Pixel::new(0x5656, 0x3434, 0x1212));

        let row = [0x34u8, 0x12, 0x78, 0x56, 0xbc, 0x9a];
        assert_eq!(
            get_pixel_from_row(&row, 0, PixelFormat::Rgb161616),
            Pixel::new(0x1234, 0x5678, 0x9abc)
        );
        assert_eq!(
            get_pixel_from_row(&row, 0, PixelFormat::Bgr161616),
            Pixel::new(0x9abc, 0x5678, 0x1234)
        );
    }

    #[test]
    fn test_raw_pixel_keeps_storage_order() {
        let row = [0x00u8, 0x00, 0x00, 0x12, 0x34, 0x56];
        let raw = get_raw_pixel_from_row(&row, 1, PixelFormat::Bgr888);
        assert_eq!(&raw.data[..3], &[0x12, 0x34, 0x56]);

        let mut out = [0u8; 6];
        set_raw_pixel_to_row(&mut out, 0, raw, PixelFormat::Bgr888);
        assert_eq!(out, [0x12, 0x34, 0x56, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_raw_channels() {
        let row = [0x10u8, 0x20, 0x30, 0x11, 0x21, 0x31];
        assert_eq!(get_raw_channel_from_row(&row, 1, 0, PixelFormat::Bgr888), 0x11);
        assert_eq!(get_raw_channel_from_row(&row, 1, 2, PixelFormat::Rgb888), 0x31);
        assert_eq!(get_raw_channel_from_row(&row, 0, 1, PixelFormat::Rgb161616), 0x1130);
        assert_eq!(get_raw_channel_from_row(&row, 2, 0, PixelFormat::I16), 0x3121);

        let mut out = [0u8; 2];
        set_raw_channel_to_row(&mut out, 2, 1, 1, PixelFormat::Rgb111);
        set_raw_channel_to_row(&mut out, 9, 0, 3, PixelFormat::I1);
        assert_eq!(out, [0b0000_0001, 0b0100_0000]);
        assert_eq!(get_raw_channel_from_row(&out, 2, 1, PixelFormat::Rgb111), 1);
        assert_eq!(get_raw_channel_from_row(&out, 2, 0, PixelFormat::Rgb111), 0);
    }

    #[test]
    fn test_convert_pixel_row_format_rgb888_to_bgr161616() {
        let input = [0x12u8, 0x34, 0x56, 0x78, 0x98, 0xab, 0xcd, 0xef, 0x21];
        let mut output = vec![0u8; 18];
        convert_pixel_row_format(&input, PixelFormat::Rgb888, &mut output, PixelFormat::Bgr161616, 3);

        let expected = [
            0x56u8, 0x56, 0x34, 0x34, 0x12, 0x12,
            0xab, 0xab, 0x98, 0x98, 0x78, 0x78,
            0x21, 0x21, 0xef, 0xef, 0xcd, 0xcd,
        ];
        assert_eq!(output, expected);
    }

    #[test]
    fn test_convert_between_channel_orders_is_lossless() {
        let input: Vec<u8> = (0..24u8).map(|v| v.wrapping_mul(37)).collect();
        let mut bgr = vec![0u8; 24];
        let mut back = vec![0u8; 24];
        convert_pixel_row_format(&input, PixelFormat::Rgb161616, &mut bgr, PixelFormat::Bgr161616, 4);
        convert_pixel_row_format(&bgr, PixelFormat::Bgr161616, &mut back, PixelFormat::Rgb161616, 4);
        assert_eq!(back, input);
    }

    #[test]
    fn test_gray_conversion_keeps_gray_values() {
        let input = [0x00u8, 0x7f, 0xff];
        let mut rgb = vec![0u8; 9];
        let mut gray = vec![0u8; 3];
        convert_pixel_row_format(&input, PixelFormat::I8, &mut rgb, PixelFormat::Rgb888, 3);
        convert_pixel_row_format(&rgb, PixelFormat::Rgb888, &mut gray, PixelFormat::I8, 3);
        assert_eq!(gray, input);
    }
}
