pub struct Cmd;
#[allow(dead_code)]
impl Cmd {
    pub const NOP: u8 = 0x00;
    pub const SWRESET: u8 = 0x01;
    pub const RDDID: u8 = 0x04;
    pub const RDDST: u8 = 0x09;
    pub const RDMODE: u8 = 0x0A;
    pub const RDMADCTL: u8 = 0x0B;
    pub const RDPIXFMT: u8 = 0x0C;
    pub const RDIMGFMT: u8 = 0x0D;
    pub const RDSELFDIAG: u8 = 0x0F;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const PTLON: u8 = 0x12;
    pub const NORON: u8 = 0x13;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const GAMMASET: u8 = 0x26;
    pub const DISPLAY_OFF: u8 = 0x28;
    pub const DISPLAY_ON: u8 = 0x29;
    pub const SET_COLUMN: u8 = 0x2A;
    pub const SET_PAGE: u8 = 0x2B;
    pub const WRITE_RAM: u8 = 0x2C;
    pub const READ_RAM: u8 = 0x2E;
    pub const PTLAR: u8 = 0x30;
    pub const VSCRDEF: u8 = 0x33;
    pub const MADCTL: u8 = 0x36;
    pub const VSCRSADD: u8 = 0x37;
    pub const PIXFMT: u8 = 0x3A;
    pub const FRMCTR1: u8 = 0xB1;
    pub const FRMCTR2: u8 = 0xB2;
    pub const FRMCTR3: u8 = 0xB3;
    pub const INVCTR: u8 = 0xB4;
    pub const DFUNCTR: u8 = 0xB6;
    pub const PWCTR1: u8 = 0xC0;
    pub const PWCTR2: u8 = 0xC1;
    pub const VMCTR1: u8 = 0xC5;
    pub const VMCTR2: u8 = 0xC7;
    pub const PWCTRA: u8 = 0xCB;
    pub const PWCTRB: u8 = 0xCF;
    pub const RDID1: u8 = 0xDA;
    pub const RDID2: u8 = 0xDB;
    pub const RDID3: u8 = 0xDC;
    pub const RDID4: u8 = 0xDD;
    pub const GMCTRP1: u8 = 0xE0;
    pub const GMCTRN1: u8 = 0xE1;
    pub const DTCA: u8 = 0xE8;
    pub const DTCB: u8 = 0xEA;
    pub const POSC: u8 = 0xED;
    pub const ENABLE3G: u8 = 0xF2;
    pub const PUMPRC: u8 = 0xF7;
}
