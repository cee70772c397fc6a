//! Which operands of an instruction are immediate literals, and how wide they are.
//!
//! Most literals are always one word, but some take the width of another value's type:
//! `OpSwitch` case literals match the selector's type, and `OpConstant` values match the result type.

use phf::phf_map;

use super::{Instruction, Opcode, Word};
use crate::convert::ConversionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralWidth {
    Always32Bits,
    /// As wide as the type of the value given in another operand.
    MatchesTypeOfOperand(usize),
    /// As wide as the instruction's result type. Operand 0 is the result type.
    MatchesResultType,
}

/// Shape of a single operand. `None` means an id, enumerant or anything else that isn't a literal number.
pub type OperandShape = Option<LiteralWidth>;

use LiteralWidth::*;

/// Operands past the end of a list repeat its tail, see [REPEATING_TAIL_LENGTHS].
const OPERAND_SHAPES: phf::Map<&'static str, &'static [OperandShape]> = phf_map! {
    "OpSource" => &[None, Some(Always32Bits), None, None],
    "OpMemberName" => &[None, Some(Always32Bits), None],
    "OpLine" => &[None, Some(Always32Bits), Some(Always32Bits)],
    "OpTypeInt" => &[None, Some(Always32Bits), Some(Always32Bits)],
    "OpTypeFloat" => &[None, Some(Always32Bits)],
    "OpTypeVector" => &[None, None, Some(Always32Bits)],
    "OpTypeMatrix" => &[None, None, Some(Always32Bits)],
    "OpTypeImage" => &[
        None,
        None,
        None,
        Some(Always32Bits),
        Some(Always32Bits),
        Some(Always32Bits),
        Some(Always32Bits),
        None,
        None,
    ],
    "OpConstantSampler" => &[None, None, None, Some(Always32Bits), None],
    "OpArrayLength" => &[None, None, None, Some(Always32Bits)],
    "OpMemberDecorate" => &[None, Some(Always32Bits), None],
    "OpGroupMemberDecorate" => &[None, Some(Always32Bits)],
    "OpVectorShuffle" => &[None, None, None, None, Some(Always32Bits)],
    "OpCompositeExtract" => &[None, None, None, Some(Always32Bits)],
    "OpCompositeInsert" => &[None, None, None, None, Some(Always32Bits)],
    "OpBranchConditional" => &[None, None, None, Some(Always32Bits)],
    "OpLifetimeStart" => &[None, Some(Always32Bits)],
    "OpLifetimeStop" => &[None, Some(Always32Bits)],
    "OpConstantPipeStorage" => &[
        None,
        None,
        Some(Always32Bits),
        Some(Always32Bits),
        Some(Always32Bits),
    ],
    "OpSwitch" => &[None, None, Some(MatchesTypeOfOperand(0)), None],
    "OpConstant" => &[None, None, Some(MatchesResultType)],
    "OpSpecConstant" => &[None, None, Some(MatchesResultType)],
};

/// How many shapes at the end of an [OPERAND_SHAPES] list repeat. Unlisted instructions repeat only the last one.
/// `OpSwitch` ends in (literal, label) pairs.
const REPEATING_TAIL_LENGTHS: phf::Map<&'static str, usize> = phf_map! {
    "OpSwitch" => 2,
};

/// Look up the literal width of operand `operand_index` of the named instruction.
/// Operands are counted as if every literal took one word.
pub fn literal_width(opcode_name: &str, operand_index: usize) -> OperandShape {
    let shapes = OPERAND_SHAPES.get(opcode_name)?;
    if let Some(shape) = shapes.get(operand_index) {
        return *shape;
    }
    let tail_length = REPEATING_TAIL_LENGTHS.get(opcode_name).copied().unwrap_or(1).min(shapes.len());
    let tail_start = shapes.len() - tail_length;
    shapes
        .get(tail_start + (operand_index - tail_start) % tail_length.max(1))
        .copied()
        .flatten()
}

/// Number of words a literal of the given bit width occupies.
pub fn literal_word_count(bit_width: u32) -> usize {
    (bit_width.max(1) as usize + 31) / 32
}

/// Read the literal number at `operand_index`, whose width is determined by `type_width`
/// when the operand-shape table says it is type-dependent. Words are low-order first.
pub fn read_literal_number(
    instruction: &Instruction,
    operand_index: usize,
    type_width: impl Fn(&LiteralWidth) -> Result<u32, ConversionError>,
) -> Result<u64, ConversionError> {
    let name = instruction.op().map_or("", |op: Opcode| op.name());
    let width = match literal_width(name, operand_index) {
        Some(Always32Bits) => 32,
        Some(shape) => type_width(&shape)?,
        None => {
            return Err(instruction.error(format!(
                "operand {} of {} is not a literal number",
                operand_index, name
            )))
        }
    };
    let word_count = literal_word_count(width);
    if word_count > 2 {
        return Err(instruction.error(format!("{}-bit literals are not supported", width)));
    }
    let words: &[Word] = instruction.operands_from(operand_index);
    if words.len() < word_count {
        return Err(instruction.error(format!(
            "{}-bit literal needs {} words but only {} remain",
            width,
            word_count,
            words.len()
        )));
    }
    Ok(words[..word_count]
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &w)| acc | (u64::from(w) << (32 * i))))
}
