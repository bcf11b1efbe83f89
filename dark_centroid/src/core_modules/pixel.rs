// THEORY:
// The `Pixel` is the smallest unit the marker works with: a "dumb" value holding
// four 8-bit channels in R, G, B, A order. The same order is used by the
// decoder when it normalizes a file, by the grid in memory, and by the encoder
// when it writes the result, so no stage ever needs to swizzle channels.
//
// The only heuristic that lives here is the dark test, because it needs nothing
// but the pixel itself.

pub type Byte = u8;
pub type Channel = Byte;

pub const CHANNELS: usize = 4;

/// Highest value a red, green or blue channel may hold for the pixel to count as dark.
pub const DARK_THRESHOLD: Channel = 225;

/// A single RGBA pixel with 8 bits per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    /// The red channel value (0-255).
    pub red: Channel,
    /// The green channel value (0-255).
    pub green: Channel,
    /// The blue channel value (0-255).
    pub blue: Channel,
    /// The alpha (transparency) channel value (0-255).
    pub alpha: Channel,
}

impl Pixel {
    pub const OPAQUE: Channel = Channel::MAX;

    pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
        Pixel {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// An opaque pixel from its color channels.
    pub const fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
        Pixel::new(red, green, blue, Self::OPAQUE)
    }

    /// An opaque gray pixel, the expansion used for grayscale sources.
    pub const fn gray(value: Channel) -> Self {
        Pixel::rgb(value, value, value)
    }

    /// True when red, green and blue are all at or below [`DARK_THRESHOLD`].
    /// Alpha plays no part.
    #[inline]
    pub fn is_dark(&self) -> bool {
        self.red <= DARK_THRESHOLD && self.green <= DARK_THRESHOLD && self.blue <= DARK_THRESHOLD
    }

    /// Replaces the color channels, leaving alpha alone.
    #[inline]
    pub fn paint(&mut self, color: Pixel) {
        self.red = color.red;
        self.green = color.green;
        self.blue = color.blue;
    }
}

impl From<[Byte; CHANNELS]> for Pixel {
    fn from(bytes: [Byte; CHANNELS]) -> Self {
        Pixel::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl From<Pixel> for [Byte; CHANNELS] {
    fn from(pixel: Pixel) -> Self {
        [pixel.red, pixel.green, pixel.blue, pixel.alpha]
    }
}
