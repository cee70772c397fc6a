use spirv_native_convert::spirv::{decode::encode_literal_string, Opcode, Word, MAGIC_NUMBER};

/// Assembles a SPIR-V 1.0 word stream one instruction at a time.
/// Every emit method returns the word offset the instruction starts at.
pub struct ModuleBuilder {
    words: Vec<Word>,
}

#[allow(dead_code)]
impl ModuleBuilder {
    pub fn new() -> Self {
        Self {
            words: vec![MAGIC_NUMBER, 0x0001_0000, 0, 100, 0],
        }
    }

    pub fn raw(&mut self, opcode: u16, operands: &[Word]) -> usize {
        let start = self.words.len();
        let word_count = (operands.len() + 1) as Word;
        self.words.push(word_count << 16 | Word::from(opcode));
        self.words.extend_from_slice(operands);
        start
    }

    pub fn op(&mut self, opcode: Opcode, operands: &[Word]) -> usize {
        self.raw(opcode as u16, operands)
    }

    pub fn name(&mut self, id: Word, name: &str) -> usize {
        let mut operands = vec![id];
        operands.extend(encode_literal_string(name));
        self.op(Opcode::Name, &operands)
    }

    pub fn entry_point(&mut self, execution_model: Word, function: Word, name: &str, interface: &[Word]) -> usize {
        let mut operands = vec![execution_model, function];
        operands.extend(encode_literal_string(name));
        operands.extend_from_slice(interface);
        self.op(Opcode::EntryPoint, &operands)
    }

    /// An empty function body: `OpFunction`, `OpLabel`, `OpReturn`, `OpFunctionEnd`
    pub fn function(&mut self, result_type: Word, id: Word, function_type: Word, parameters: &[(Word, Word)]) -> usize {
        let start = self.op(Opcode::Function, &[result_type, id, 0, function_type]);
        for &(param_type, param_id) in parameters {
            self.op(Opcode::FunctionParameter, &[param_type, param_id]);
        }
        // OpLabel and OpReturn aren't listed in Opcode, the converter skips them
        self.raw(248, &[id + 1000]);
        self.raw(253, &[]);
        self.op(Opcode::FunctionEnd, &[]);
        start
    }

    pub fn words(&self) -> Vec<Word> {
        self.words.clone()
    }
}
