pub struct Flag;
#[allow(dead_code)]
impl Flag {
    /// COLMOD value selecting 16 bits per pixel.
    pub const PIXEL_FORMAT_16BPP: u8 = 0x55;
    pub const MADCTL_ROTATE_0: u8 = 0x88;
    pub const MADCTL_ROTATE_90: u8 = 0xE8;
    pub const MADCTL_ROTATE_180: u8 = 0x48;
    pub const MADCTL_ROTATE_270: u8 = 0x28;
}
