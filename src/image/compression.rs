//! CMP 位流解压
//!
//! 行为与 Z80 解压例程一致。一个 8 字节查找表逐位决定每个输出字节
//! 是从数据流读取还是直接补 0；查找表本身也由一个控制字节加上
//! 若干数据字节压缩存放。

use crate::error::{DecodeError, Result};

/// 查找表长度
pub const LOOKUP_TABLE_LEN: usize = 8;

/// 位流读取器
#[derive(Debug, Clone)]
pub struct BitStreamReader<'a> {
    data: &'a [u8],
    /// 下一个待读字节的位置
    offset: usize,
    lookup_table: [u8; LOOKUP_TABLE_LEN],
    /// 下一次从查找表装载的位置
    table_index: usize,
    bit_buffer: u8,
    /// 剩余位数，减到 0 时重新装载
    bit_counter: u8,
}

impl<'a> BitStreamReader<'a> {
    /// 从 `offset` 处开始读取，并立即装载第一张查找表
    pub fn new(data: &'a [u8], offset: usize) -> Result<Self> {
        if offset >= data.len() {
            return Err(DecodeError::truncated("CMP 位流", offset + 1, data.len()));
        }

        let mut reader = Self {
            data,
            offset,
            lookup_table: [0; LOOKUP_TABLE_LEN],
            table_index: 0,
            bit_buffer: 0,
            bit_counter: 0,
        };
        reader.read_lookup_table()?;
        Ok(reader)
    }

    fn next_input(&mut self) -> Result<u8> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(DecodeError::UnrecoverableStreamEnd {
                offset: self.offset,
            })?;
        self.offset += 1;
        Ok(byte)
    }

    /// 读取新的查找表: 控制字节从高位到低位，置位则读入一个字节，否则填 0
    pub fn read_lookup_table(&mut self) -> Result<()> {
        let control = self.next_input()?;

        for i in 0..LOOKUP_TABLE_LEN {
            self.lookup_table[i] = if control & (0x80 >> i) != 0 {
                self.next_input()?
            } else {
                0
            };
        }

        self.bit_buffer = self.lookup_table[0];
        self.bit_counter = 8;
        self.table_index = 1;
        Ok(())
    }

    /// 读取下一个输出字节
    ///
    /// 必须先判断进位、再递减计数、最后才重新装载。
    pub fn read_byte(&mut self) -> Result<u8> {
        let carry = self.bit_buffer & 0x80 != 0;
        self.bit_buffer <<= 1;

        let result = if carry { self.next_input()? } else { 0 };

        self.bit_counter -= 1;
        if self.bit_counter == 0 {
            self.reload()?;
        }

        Ok(result)
    }

    fn reload(&mut self) -> Result<()> {
        if self.table_index < LOOKUP_TABLE_LEN {
            self.bit_buffer = self.lookup_table[self.table_index];
            self.table_index += 1;
            self.bit_counter = 8;
            return Ok(());
        }

        if self.offset < self.data.len() {
            return self.read_lookup_table();
        }

        // 数据已读完: 之后的字节全部为 0
        self.lookup_table = [0; LOOKUP_TABLE_LEN];
        self.bit_buffer = 0;
        self.bit_counter = 8;
        self.table_index = 0;
        Ok(())
    }

    /// 下一个待读字节的位置
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 当前查找表
    pub fn lookup_table(&self) -> &[u8; LOOKUP_TABLE_LEN] {
        &self.lookup_table
    }

    /// 当前位缓冲
    pub fn bit_buffer(&self) -> u8 {
        self.bit_buffer
    }

    /// 位缓冲中剩余的位数
    pub fn bits_remaining(&self) -> u8 {
        self.bit_counter
    }

    /// 下一次装载的查找表位置
    pub fn table_index(&self) -> usize {
        self.table_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_full_lookup_table() {
        let data = [0xFF, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        let reader = BitStreamReader::new(&data, 0).unwrap();
        assert_eq!(reader.lookup_table(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(reader.bit_buffer(), 0x01);
        assert_eq!(reader.bits_remaining(), 8);
        assert_eq!(reader.table_index(), 1);
        assert_eq!(reader.offset(), 9);
    }

    #[test]
    fn test_empty_control_byte_consumes_nothing() {
        let data = [0x00, 0xAA, 0xBB];
        let reader = BitStreamReader::new(&data, 0).unwrap();
        assert_eq!(reader.lookup_table(), &[0; 8]);
        assert_eq!(reader.offset(), 1);
    }

    #[test]
    fn test_sparse_control_byte() {
        // 0b1000_0001: 只填充第 0 和第 7 个槽位
        let data = [0x81, 0x11, 0x22, 0x99];
        let reader = BitStreamReader::new(&data, 0).unwrap();
        assert_eq!(reader.lookup_table(), &[0x11, 0, 0, 0, 0, 0, 0, 0x22]);
        assert_eq!(reader.offset(), 3);
    }

    #[test]
    fn test_truncated_lookup_table() {
        let data = [0xC0, 0x01];
        let err = BitStreamReader::new(&data, 0).unwrap_err();
        assert!(matches!(err, DecodeError::UnrecoverableStreamEnd { offset: 2 }));

        let err = BitStreamReader::new(&data, 2).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedInput { .. }));
    }

    #[test]
    fn test_read_bytes_follow_bits() {
        // 表[0] = 0b1010_0000: 第 1、3 个输出字节来自数据流
        let data = [0x80, 0xA0, 0x11, 0x22];
        let mut reader = BitStreamReader::new(&data, 0).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0x11);
        assert_eq!(reader.read_byte().unwrap(), 0x00);
        assert_eq!(reader.read_byte().unwrap(), 0x22);
        assert_eq!(reader.bits_remaining(), 5);
    }

    #[test]
    fn test_reload_from_table_advances_index() {
        let data = [0x40, 0x80, 0x33];
        let mut reader = BitStreamReader::new(&data, 0).unwrap();
        for _ in 0..8 {
            assert_eq!(reader.read_byte().unwrap(), 0);
        }
        assert_eq!(reader.table_index(), 2);
        assert_eq!(reader.bit_buffer(), 0x80);
        assert_eq!(reader.read_byte().unwrap(), 0x33);
    }

    #[test]
    fn test_missing_byte_for_set_bit() {
        let data = [0x80, 0x80];
        let mut reader = BitStreamReader::new(&data, 0).unwrap();
        let err = reader.read_byte().unwrap_err();
        assert!(matches!(err, DecodeError::UnrecoverableStreamEnd { offset: 2 }));
    }

    #[test]
    fn test_end_of_stream_yields_zeros() {
        let data = [0x00];
        let mut reader = BitStreamReader::new(&data, 0).unwrap();
        // 远超一张查找表的 64 位
        for _ in 0..1000 {
            assert_eq!(reader.read_byte().unwrap(), 0);
        }
        assert_eq!(reader.lookup_table(), &[0; 8]);
    }

    #[test]
    fn test_new_table_read_after_exhaustion() {
        // 第一张表全 0，用完 64 位后读取第二张表
        let data = [0x00, 0x80, 0x80, 0x5A];
        let mut reader = BitStreamReader::new(&data, 0).unwrap();
        for _ in 0..64 {
            assert_eq!(reader.read_byte().unwrap(), 0);
        }
        assert_eq!(reader.offset(), 3);
        assert_eq!(reader.read_byte().unwrap(), 0x5A);
    }
}
