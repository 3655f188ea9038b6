#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use goblin::pe::PE;
use uwin_lift_core::image::DebugInfoSource;
use uwin_lift_core::interchange;
use uwin_lift_core::model::{AddressDescriptor, DebugSymbolTable};
use uwin_lift_core::services::{
    DisassemblyEngine, LiftRequest, Lifter, PipelineState, ProgressReporter, RecompileRequest,
    RecoverRequest, Recompiler, Stage,
};
use uwin_lift_core::PipelineError;

pub const SCN_CODE: u32 = 0x0000_0020;
pub const SCN_INITIALIZED_DATA: u32 = 0x0000_0040;
pub const SCN_EXECUTE: u32 = 0x2000_0000;
pub const SCN_READ: u32 = 0x4000_0000;
pub const SCN_WRITE: u32 = 0x8000_0000;

const PE_OFFSET: usize = 0x80;
const OPTIONAL_HEADER_SIZE: usize = 224;
const FILE_ALIGN: usize = 0x200;
const SECTION_ALIGN: usize = 0x1000;

pub struct FixtureSection {
    pub name: &'static str,
    pub virtual_address: u32,
    pub characteristics: u32,
    pub data: Vec<u8>,
}

impl FixtureSection {
    pub fn text(virtual_address: u32, data: Vec<u8>) -> Self {
        Self {
            name: ".text",
            virtual_address,
            characteristics: SCN_CODE | SCN_EXECUTE | SCN_READ,
            data,
        }
    }

    pub fn data(virtual_address: u32, data: Vec<u8>) -> Self {
        Self {
            name: ".data",
            virtual_address,
            characteristics: SCN_INITIALIZED_DATA | SCN_READ | SCN_WRITE,
            data,
        }
    }
}

fn align(value: usize, to: usize) -> usize {
    value.div_ceil(to) * to
}

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Assemble a minimal PE32 i386 executable with the given sections.
pub fn build_pe(image_base: u32, sections: &[FixtureSection]) -> Vec<u8> {
    build_pe_with_directories(image_base, sections, &[])
}

/// Same as [`build_pe`], also filling data directories as `(index, rva, size)`.
pub fn build_pe_with_directories(
    image_base: u32,
    sections: &[FixtureSection],
    directories: &[(usize, u32, u32)],
) -> Vec<u8> {
    let coff = PE_OFFSET + 4;
    let opt = coff + 20;
    let table = opt + OPTIONAL_HEADER_SIZE;
    let headers_size = align(table + 40 * sections.len(), FILE_ALIGN);

    let mut raw_offsets = Vec::new();
    let mut cursor = headers_size;
    for s in sections {
        raw_offsets.push(cursor);
        cursor += align(s.data.len(), FILE_ALIGN);
    }
    let mut buf = vec![0u8; cursor];

    buf[0..2].copy_from_slice(b"MZ");
    put_u32(&mut buf, 0x3c, PE_OFFSET as u32);
    buf[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");

    put_u16(&mut buf, coff, 0x14c);
    put_u16(&mut buf, coff + 2, sections.len() as u16);
    put_u16(&mut buf, coff + 16, OPTIONAL_HEADER_SIZE as u16);
    put_u16(&mut buf, coff + 18, 0x0102);

    let size_of_image = sections
        .iter()
        .map(|s| align(s.virtual_address as usize + s.data.len().max(1), SECTION_ALIGN))
        .max()
        .unwrap_or(SECTION_ALIGN);

    put_u16(&mut buf, opt, 0x10b);
    put_u32(&mut buf, opt + 28, image_base);
    put_u32(&mut buf, opt + 32, SECTION_ALIGN as u32);
    put_u32(&mut buf, opt + 36, FILE_ALIGN as u32);
    put_u16(&mut buf, opt + 40, 4);
    put_u16(&mut buf, opt + 48, 4);
    put_u32(&mut buf, opt + 56, size_of_image as u32);
    put_u32(&mut buf, opt + 60, headers_size as u32);
    put_u16(&mut buf, opt + 68, 3);
    put_u32(&mut buf, opt + 72, 0x10_0000);
    put_u32(&mut buf, opt + 76, 0x1000);
    put_u32(&mut buf, opt + 80, 0x10_0000);
    put_u32(&mut buf, opt + 84, 0x1000);
    put_u32(&mut buf, opt + 92, 16);
    for &(index, rva, size) in directories {
        put_u32(&mut buf, opt + 96 + 8 * index, rva);
        put_u32(&mut buf, opt + 100 + 8 * index, size);
    }

    for (idx, s) in sections.iter().enumerate() {
        let at = table + 40 * idx;
        let name = s.name.as_bytes();
        buf[at..at + name.len().min(8)].copy_from_slice(&name[..name.len().min(8)]);
        put_u32(&mut buf, at + 8, s.data.len() as u32);
        put_u32(&mut buf, at + 12, s.virtual_address);
        put_u32(&mut buf, at + 16, align(s.data.len(), FILE_ALIGN) as u32);
        put_u32(&mut buf, at + 20, raw_offsets[idx] as u32);
        put_u32(&mut buf, at + 36, s.characteristics);
        buf[raw_offsets[idx]..raw_offsets[idx] + s.data.len()].copy_from_slice(&s.data);
    }
    buf
}

pub fn write_pe(dir: &Path, name: &str, image_base: u32, sections: &[FixtureSection]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pe(image_base, sections)).unwrap();
    path
}

/// A fixed symbol table, standing in for a debug-info parser.
pub struct StaticSymbols(pub DebugSymbolTable);

impl StaticSymbols {
    pub fn of(entries: &[(&str, u64, u64)]) -> Self {
        Self(entries.iter().map(|(n, p, s)| (*n, AddressDescriptor::new(*p, *s))).collect())
    }
}

impl DebugInfoSource for StaticSymbols {
    fn symbols(&self, _pe: &PE<'_>, _path: &Path) -> Result<DebugSymbolTable, PipelineError> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

pub type CallLog = Rc<RefCell<Vec<&'static str>>>;

fn tool_failure(tool: &str, log: &str) -> PipelineError {
    PipelineError::ExternalTool {
        tool: tool.to_string(),
        status: "exit status: 1".to_string(),
        log: log.to_string(),
    }
}

/// Engine that records the seed file and emits a fixed, unordered block list.
pub struct FakeEngine {
    pub calls: CallLog,
    pub emit: Vec<u64>,
    pub fail_with: Option<String>,
    pub seeds_seen: RefCell<Option<String>>,
    pub work_dirs: RefCell<Vec<PathBuf>>,
}

impl FakeEngine {
    pub fn new(calls: &CallLog, emit: Vec<u64>) -> Self {
        Self {
            calls: calls.clone(),
            emit,
            fail_with: None,
            seeds_seen: RefCell::new(None),
            work_dirs: RefCell::new(Vec::new()),
        }
    }
}

impl DisassemblyEngine for FakeEngine {
    fn recover(&self, request: &RecoverRequest) -> Result<(), PipelineError> {
        self.calls.borrow_mut().push("recover");
        self.work_dirs.borrow_mut().push(request.work_dir.clone());
        *self.seeds_seen.borrow_mut() = Some(std::fs::read_to_string(&request.seeds_path).unwrap());
        if let Some(log) = &self.fail_with {
            return Err(tool_failure(self.name(), log));
        }
        interchange::write_addresses(&request.result_path, self.emit.iter().copied())
    }

    fn name(&self) -> &'static str {
        "fake-ghidra"
    }
}

/// Lifter that snapshots its inputs and writes a placeholder IR module.
pub struct FakeLifter {
    pub calls: CallLog,
    pub fail_with: Option<String>,
    pub blocks_seen: RefCell<Option<String>>,
    pub name_map_seen: RefCell<Option<String>>,
    pub code_seen: RefCell<Option<Vec<u8>>>,
    pub load_address_seen: RefCell<Option<u64>>,
}

impl FakeLifter {
    pub fn new(calls: &CallLog) -> Self {
        Self {
            calls: calls.clone(),
            fail_with: None,
            blocks_seen: RefCell::new(None),
            name_map_seen: RefCell::new(None),
            code_seen: RefCell::new(None),
            load_address_seen: RefCell::new(None),
        }
    }
}

impl Lifter for FakeLifter {
    fn lift(&self, request: &LiftRequest) -> Result<PathBuf, PipelineError> {
        self.calls.borrow_mut().push("lift");
        *self.blocks_seen.borrow_mut() =
            Some(std::fs::read_to_string(&request.blocks_path).unwrap());
        *self.name_map_seen.borrow_mut() =
            Some(std::fs::read_to_string(&request.name_map_path).unwrap());
        *self.code_seen.borrow_mut() = Some(std::fs::read(&request.code_path).unwrap());
        *self.load_address_seen.borrow_mut() = Some(request.load_address);
        if let Some(log) = &self.fail_with {
            return Err(tool_failure(self.name(), log));
        }
        std::fs::write(&request.ir_path, "; lifted\n").unwrap();
        Ok(request.ir_path.clone())
    }

    fn name(&self) -> &'static str {
        "fake-lift"
    }
}

/// Compiler that copies the IR into the requested object path.
pub struct FakeRecompiler {
    pub calls: CallLog,
}

impl Recompiler for FakeRecompiler {
    fn recompile(&self, request: &RecompileRequest) -> Result<PathBuf, PipelineError> {
        self.calls.borrow_mut().push("recompile");
        std::fs::copy(&request.ir_path, &request.object_path).unwrap();
        Ok(request.object_path.clone())
    }

    fn name(&self) -> &'static str {
        "fake-clang"
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    pub events: RefCell<Vec<String>>,
    pub states: RefCell<Vec<PipelineState>>,
}

impl ProgressReporter for RecordingProgress {
    fn state_changed(&self, state: PipelineState) {
        self.states.borrow_mut().push(state);
    }

    fn stage_started(&self, stage: Stage) {
        self.events.borrow_mut().push(format!("start {stage}"));
    }

    fn stage_finished(&self, stage: Stage, _elapsed: Duration) {
        self.events.borrow_mut().push(format!("done {stage}"));
    }

    fn stage_failed(&self, stage: Stage, _error: &PipelineError) {
        self.events.borrow_mut().push(format!("failed {stage}"));
    }

    fn tool_output(&self, tool: &str, log: &str) {
        self.events.borrow_mut().push(format!("log {tool}: {log}"));
    }
}
