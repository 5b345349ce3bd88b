pub const MAGIC: u32 = 0xCAFEBABE;

pub const ATTR_CONSTANT_VALUE: &str = "ConstantValue";
pub const ATTR_CODE: &str = "Code";
