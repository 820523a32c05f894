//! Builds small synthetic MOBI containers for tests.

#![allow(dead_code)]

pub const EXTH_FLAG: u32 = 0x40;

pub const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0xFF, 0xD9,
];
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n-png-";
pub const GIF: &[u8] = b"GIF89a-gif-data";

/// Record layout: record zero, text records, image records, EOF record.
pub struct BookBuilder {
    pub name: Vec<u8>,
    pub title: Vec<u8>,
    pub header_length: u32,
    pub encoding: u32,
    pub exth_flag: bool,
    pub write_exth: bool,
    pub exth: Vec<(u32, Vec<u8>)>,
    pub text_records: usize,
    pub images: Vec<Vec<u8>>,
}

impl BookBuilder {
    pub fn new(title: &str) -> Self {
        Self {
            name: b"Test_Book".to_vec(),
            title: title.as_bytes().to_vec(),
            header_length: 232,
            encoding: 65001,
            exth_flag: true,
            write_exth: true,
            exth: Vec::new(),
            text_records: 2,
            images: Vec::new(),
        }
    }

    pub fn exth_record(mut self, kind: u32, data: &[u8]) -> Self {
        self.exth.push((kind, data.to_vec()));
        self
    }

    /// Adds a cover record (EXTH 201) pointing at image `relative`.
    pub fn cover(self, relative: u32) -> Self {
        self.exth_record(201, &relative.to_be_bytes())
    }

    pub fn thumbnail(self, relative: u32) -> Self {
        self.exth_record(202, &relative.to_be_bytes())
    }

    pub fn image(mut self, data: &[u8]) -> Self {
        self.images.push(data.to_vec());
        self
    }

    pub fn text_records(mut self, count: usize) -> Self {
        self.text_records = count;
        self
    }

    pub fn without_exth(mut self) -> Self {
        self.exth_flag = false;
        self.write_exth = false;
        self
    }

    pub fn first_image_index(&self) -> u32 {
        1 + self.text_records as u32
    }

    pub fn build(&self) -> Vec<u8> {
        let mut records = vec![self.record_zero()];
        for i in 0..self.text_records {
            records.push(format!("<p>text record {i}</p>").into_bytes());
        }
        records.extend(self.images.iter().cloned());
        records.push(vec![0xE9, 0x8E, 0x0D, 0x0A]); // EOF record

        let mut data = vec![0u8; 78];
        data[..self.name.len()].copy_from_slice(&self.name);
        data[60..68].copy_from_slice(b"BOOKMOBI");
        data[76..78].copy_from_slice(&(records.len() as u16).to_be_bytes());

        let mut offset = 78 + 8 * records.len() as u32 + 2;
        for (i, record) in records.iter().enumerate() {
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&(2 * i as u32).to_be_bytes());
            offset += record.len() as u32;
        }
        data.extend_from_slice(&[0, 0]);
        for record in &records {
            data.extend_from_slice(record);
        }
        data
    }

    fn record_zero(&self) -> Vec<u8> {
        let exth = if self.write_exth {
            self.exth_bytes()
        } else {
            Vec::new()
        };

        let mut record = Vec::new();
        record.extend_from_slice(&1u16.to_be_bytes()); // no compression
        record.extend_from_slice(&[0, 0]);
        record.extend_from_slice(&(self.text_records as u32 * 16).to_be_bytes());
        record.extend_from_slice(&(self.text_records as u16).to_be_bytes());
        record.extend_from_slice(&4096u16.to_be_bytes());
        record.extend_from_slice(&[0, 0, 0, 0]);

        let full_name_offset = 16 + self.header_length + exth.len() as u32;
        let mut mobi = vec![0u8; self.header_length as usize];
        let mut put = |pos: usize, value: u32| {
            if pos + 4 <= mobi.len() {
                mobi[pos..pos + 4].copy_from_slice(&value.to_be_bytes());
            }
        };
        put(0, u32::from_be_bytes(*b"MOBI"));
        put(4, self.header_length);
        put(8, 2); // mobipocket book
        put(12, self.encoding);
        put(16, 0x1234_5678);
        put(20, 6);
        put(64, self.first_image_index());
        put(68, full_name_offset);
        put(72, self.title.len() as u32);
        put(76, 9); // English
        put(88, 6);
        put(92, self.first_image_index());
        put(112, if self.exth_flag { EXTH_FLAG | 0x10 } else { 0x10 });

        record.extend_from_slice(&mobi);
        record.extend_from_slice(&exth);
        record.extend_from_slice(&self.title);
        record.extend_from_slice(&[0, 0]);
        record
    }

    fn exth_bytes(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (kind, payload) in &self.exth {
            body.extend_from_slice(&kind.to_be_bytes());
            body.extend_from_slice(&(8 + payload.len() as u32).to_be_bytes());
            body.extend_from_slice(payload);
        }
        let padding = (4 - body.len() % 4) % 4;

        let mut exth = Vec::new();
        exth.extend_from_slice(b"EXTH");
        exth.extend_from_slice(&(12 + body.len() as u32).to_be_bytes());
        exth.extend_from_slice(&(self.exth.len() as u32).to_be_bytes());
        exth.extend_from_slice(&body);
        exth.extend(std::iter::repeat_n(0u8, padding));
        exth
    }
}

/// Absolute offset of record `index` in a built container.
pub fn record_offset(built: &[u8], index: usize) -> usize {
    let pos = 78 + 8 * index;
    u32::from_be_bytes([built[pos], built[pos + 1], built[pos + 2], built[pos + 3]]) as usize
}
