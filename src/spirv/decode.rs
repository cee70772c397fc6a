//! Splits a SPIR-V binary into its header and a randomly-indexable list of instructions.
//!
//! Instruction word offsets are kept verbatim so every diagnostic can point back into the original stream.

use bitutils::bits;
use nom::{
    combinator::{all_consuming, complete},
    multi::many0,
    number::{complete::u32 as word, Endianness},
    IResult,
};
use num_traits::FromPrimitive;

use crate::convert::ConversionError;

use super::{Opcode, Word, HEADER_WORD_COUNT, MAGIC_NUMBER};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpirvHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub generator: Word,
    pub id_bound: Word,
}

/// One decoded instruction. `start_index`/`end_index` are word offsets into the module, `end_index` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: u16,
    pub operands: Vec<Word>,
    pub start_index: usize,
    pub end_index: usize,
}
impl Instruction {
    /// The decoded opcode, or None if the converter doesn't know about it.
    pub fn op(&self) -> Option<Opcode> {
        Opcode::from_u16(self.opcode)
    }

    pub fn error(&self, message: impl Into<String>) -> ConversionError {
        ConversionError::spanning(self.start_index, self.end_index, message)
    }

    /// Fetch a single operand word, failing with this instruction's position if it's missing.
    pub fn operand(&self, index: usize) -> Result<Word, ConversionError> {
        self.operands.get(index).copied().ok_or_else(|| {
            self.error(format!(
                "{} is missing operand {}",
                self.op().map_or("instruction", |op| op.name()),
                index
            ))
        })
    }

    pub fn operands_from(&self, index: usize) -> &[Word] {
        self.operands.get(index..).unwrap_or(&[])
    }

    /// Decode the literal string starting at operand `index`.
    /// Returns the string and the index of the first operand after it.
    pub fn literal_string(&self, index: usize) -> Result<(String, usize), ConversionError> {
        let (s, word_len) = decode_literal_string(self.operands_from(index))
            .map_err(|message| self.error(message))?;
        Ok((s, index + word_len))
    }
}

#[derive(Debug, Clone)]
pub struct SpirvModule {
    pub header: SpirvHeader,
    pub instructions: Vec<Instruction>,
}

/// Reinterpret a byte buffer as SPIR-V words, picking the endianness from the magic number.
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<Word>, ConversionError> {
    if bytes.len() % 4 != 0 {
        return Err(ConversionError::new(
            bytes.len() / 4,
            format!("SPIR-V binary length {} is not a multiple of 4", bytes.len()),
        ));
    }
    let endianness = match bytes.get(0..4) {
        Some(magic) if magic == MAGIC_NUMBER.to_le_bytes() => Endianness::Little,
        Some(magic) if magic == MAGIC_NUMBER.to_be_bytes() => Endianness::Big,
        _ => return Err(ConversionError::new(0, "invalid SPIR-V magic number")),
    };
    let parse: IResult<&[u8], Vec<Word>> = all_consuming(many0(complete(word(endianness))))(bytes);
    match parse {
        Ok((_, words)) => Ok(words),
        Err(e) => Err(ConversionError::new(0, format!("couldn't split SPIR-V binary into words: {:?}", e))),
    }
}

fn parse_header(words: &[Word]) -> Result<SpirvHeader, ConversionError> {
    if words.len() < HEADER_WORD_COUNT {
        return Err(ConversionError::spanning(0, words.len(), "SPIR-V module is too short to hold a header"));
    }
    if words[0] != MAGIC_NUMBER {
        return Err(ConversionError::new(0, "invalid SPIR-V magic number"));
    }
    let version = words[1];
    let header = SpirvHeader {
        version_major: bits!(version, 16:23) as u8,
        version_minor: bits!(version, 8:15) as u8,
        generator: words[2],
        id_bound: words[3],
    };
    if header.version_major != 1 {
        return Err(ConversionError::new(
            1,
            format!("unsupported SPIR-V version {}.{}", header.version_major, header.version_minor),
        ));
    }
    if words[4] != 0 {
        return Err(ConversionError::new(4, format!("unsupported SPIR-V schema {}", words[4])));
    }
    Ok(header)
}

fn decode_instruction(words: &[Word], start_index: usize) -> Result<Instruction, ConversionError> {
    let first = words[start_index];
    let opcode = bits!(first, 0:15) as u16;
    let word_count = bits!(first, 16:31) as usize;
    if word_count == 0 {
        return Err(ConversionError::new(start_index, "instruction has a word count of zero"));
    }
    let end_index = start_index + word_count;
    if end_index > words.len() {
        return Err(ConversionError::spanning(
            start_index,
            words.len(),
            format!("instruction with {} words runs past the end of the module", word_count),
        ));
    }
    Ok(Instruction {
        opcode,
        operands: words[start_index + 1..end_index].to_vec(),
        start_index,
        end_index,
    })
}

/// Decode a module from its word stream.
///
/// A byte-swapped magic number means the words were read with the wrong endianness; they're swapped back first.
pub fn parse_module(words: &[Word]) -> Result<SpirvModule, ConversionError> {
    let swapped: Vec<Word>;
    let words = match words.first() {
        Some(&magic) if magic == MAGIC_NUMBER.swap_bytes() => {
            swapped = words.iter().map(|w| w.swap_bytes()).collect();
            swapped.as_slice()
        }
        _ => words,
    };

    let header = parse_header(words)?;

    let mut instructions = vec![];
    let mut index = HEADER_WORD_COUNT;
    while index < words.len() {
        let instruction = decode_instruction(words, index)?;
        index = instruction.end_index;
        instructions.push(instruction);
    }
    Ok(SpirvModule { header, instructions })
}

/// Decode a nul-terminated UTF-8 string packed little-endian into words.
/// Returns the string and the number of words it occupied, including the terminator.
pub fn decode_literal_string(words: &[Word]) -> Result<(String, usize), String> {
    let mut bytes = vec![];
    for (i, w) in words.iter().enumerate() {
        for b in w.to_le_bytes() {
            if b == 0 {
                let s = String::from_utf8(bytes).map_err(|e| format!("literal string is not UTF-8: {}", e))?;
                return Ok((s, i + 1));
            }
            bytes.push(b);
        }
    }
    Err("literal string is missing its nul terminator".to_owned())
}

/// Pack a string into words the way SPIR-V literal strings are stored.
pub fn encode_literal_string(s: &str) -> Vec<Word> {
    let mut bytes = s.as_bytes().to_vec();
    // at least one nul, then pad to a word boundary
    bytes.push(0);
    while bytes.len() % 4 != 0 {
        bytes.push(0);
    }
    bytes
        .chunks_exact(4)
        .map(|c| Word::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}
