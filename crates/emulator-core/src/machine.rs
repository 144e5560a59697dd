//! The QProc machine: program memory, two stacks and the fetch loop.

use std::path::Path;

use log::{debug, trace, warn};

use crate::api::{EmulatorConfig, Host, RunBoundary, RunOutcome, StepOutcome, TraceEvent};
use crate::decoder::{decode_at, DecodeError};
use crate::execute::{commit_execution, execute_instruction, ExecuteState, ReturnStackOp};
use crate::image::{ImageError, ProgramImage};
use crate::memory::ProgramMemory;
use crate::peripherals::video::Frame;
use crate::state::{BoundedStack, MachineSnapshot, RunState};
use crate::{Fault, FaultCode};

/// One emulator instance. Owns its memory and stacks for its whole run.
#[derive(Debug, Clone)]
pub struct Machine {
    memory: ProgramMemory,
    data: BoundedStack<i32>,
    returns: BoundedStack<usize>,
    ip: usize,
    steps: u64,
    run_state: RunState,
    fault: Option<Fault>,
    config: EmulatorConfig,
}

impl Machine {
    /// Creates a machine with `image` at address 0 and IP at 0.
    #[must_use]
    pub fn new(image: &ProgramImage, config: EmulatorConfig) -> Self {
        debug!(
            "machine ready: {} byte image, stacks {}/{}",
            image.len(),
            config.data_stack_capacity,
            config.instruction_stack_capacity
        );
        Self {
            memory: ProgramMemory::with_prefix(image.as_bytes()),
            data: BoundedStack::new(config.data_stack_capacity),
            returns: BoundedStack::new(config.instruction_stack_capacity),
            ip: 0,
            steps: 0,
            run_state: RunState::Running,
            fault: None,
            config,
        }
    }

    /// Loads a ROM from disk.
    ///
    /// # Errors
    ///
    /// Returns an [`ImageError`] when the file cannot be read or does not fit
    /// in program memory.
    pub fn load(path: &Path, config: EmulatorConfig) -> Result<Self, ImageError> {
        let image = ProgramImage::load(path)?;
        Ok(Self::new(&image, config))
    }

    /// Executes exactly one instruction.
    ///
    /// Once the machine has stopped, every further call returns the same
    /// terminal outcome without executing anything.
    pub fn step(&mut self, host: &mut Host<'_>) -> StepOutcome {
        match self.run_state {
            RunState::Running => {}
            RunState::Halted => return StepOutcome::Halted,
            RunState::EndOfMemory => return StepOutcome::EndOfMemory,
            RunState::FaultLatched(cause) => return StepOutcome::Fault { cause },
        }

        if let Some(sink) = host.frame.as_deref_mut() {
            if let Some(frame) = Frame::new(self.memory.frame_buffer()) {
                sink.present(&frame);
            }
        }

        let ip = self.ip;
        let instr = match decode_at(self.memory.as_slice(), ip) {
            Ok(instr) => instr,
            Err(DecodeError::OutOfRange) => {
                self.run_state = RunState::EndOfMemory;
                return StepOutcome::EndOfMemory;
            }
            Err(DecodeError::UnknownOpcode(byte)) => {
                return self.raise(FaultCode::UnknownOpcode(byte), host);
            }
            Err(DecodeError::TruncatedOperand) => {
                return self.raise(FaultCode::TruncatedOperand, host);
            }
        };

        host.emit(TraceEvent::InstructionStart {
            ip,
            opcode: instr.opcode,
            operand: instr.operand,
        });
        match instr.operand {
            Some(operand) => trace!("{ip:05} {} {operand}", instr.opcode),
            None => trace!("{ip:05} {}", instr.opcode),
        }

        let exec = match execute_instruction(&instr, self, &mut *host.console) {
            Ok(exec) => exec,
            Err(cause) => return self.raise(cause, host),
        };
        commit_execution(self, &exec);
        host.emit(TraceEvent::InstructionRetired {
            ip,
            next_ip: self.ip,
            data_depth: self.data.len(),
        });

        if exec.halt {
            self.run_state = RunState::Halted;
            debug!("halted at {ip} after {} steps", self.steps);
            StepOutcome::Halted
        } else if self.ip >= self.memory.capacity() {
            self.run_state = RunState::EndOfMemory;
            debug!("ran off the end of memory after {} steps", self.steps);
            StepOutcome::EndOfMemory
        } else {
            StepOutcome::Retired {
                opcode: instr.opcode,
            }
        }
    }

    /// Runs until `HALT`, the end of memory, the configured step limit or a
    /// fault.
    ///
    /// # Errors
    ///
    /// Returns the latched [`Fault`] when the run stops on a fault.
    pub fn run(&mut self, host: &mut Host<'_>) -> Result<RunOutcome, Fault> {
        let start = self.steps;
        loop {
            let retired = self.steps - start;
            if !self.run_state.is_terminal()
                && self.config.max_steps.is_some_and(|limit| retired >= limit)
            {
                return Ok(RunOutcome {
                    steps: retired,
                    boundary: RunBoundary::StepLimit,
                });
            }

            let boundary = match self.step(host) {
                StepOutcome::Retired { .. } => continue,
                StepOutcome::Halted => RunBoundary::Halted,
                StepOutcome::EndOfMemory => RunBoundary::EndOfMemory,
                StepOutcome::Fault { cause } => return Err(self.latched_fault(cause)),
            };
            return Ok(RunOutcome {
                steps: self.steps - start,
                boundary,
            });
        }
    }

    pub(crate) fn commit(&mut self, exec: &ExecuteState) {
        for _ in 0..exec.data_pops {
            self.data.pop();
        }
        // Room and addresses were checked while computing `exec`.
        if let Some(value) = exec.data_push {
            let pushed = self.data.push(value);
            debug_assert!(pushed.is_ok(), "data push was not pre-checked");
        }
        match exec.return_op {
            ReturnStackOp::None => {}
            ReturnStackOp::Push(addr) => {
                let pushed = self.returns.push(addr);
                debug_assert!(pushed.is_ok(), "return push was not pre-checked");
            }
            ReturnStackOp::Pop => {
                self.returns.pop();
            }
        }
        if let Some((addr, value)) = exec.memory_write {
            let written = self.memory.write_word(addr, value);
            debug_assert!(written.is_some(), "memory write was not pre-checked");
        }
        self.ip = exec.next_ip;
        self.steps += 1;
    }

    fn raise(&mut self, code: FaultCode, host: &mut Host<'_>) -> StepOutcome {
        let fault = Fault {
            code,
            address: self.ip,
            snapshot: self.snapshot(),
        };
        warn!("{fault}");
        host.emit(TraceEvent::FaultRaised {
            cause: code,
            ip: self.ip,
        });
        self.run_state = RunState::FaultLatched(code);
        self.fault = Some(fault);
        StepOutcome::Fault { cause: code }
    }

    fn latched_fault(&self, code: FaultCode) -> Fault {
        self.fault.clone().unwrap_or_else(|| Fault {
            code,
            address: self.ip,
            snapshot: self.snapshot(),
        })
    }

    /// Captures IP, both stacks and the step counter.
    #[must_use]
    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            ip: self.ip,
            data_stack: self.data.as_slice().to_vec(),
            instruction_stack: self.returns.as_slice().to_vec(),
            steps: self.steps,
        }
    }

    /// Address of the next instruction.
    #[must_use]
    pub const fn ip(&self) -> usize {
        self.ip
    }

    /// Instructions retired since creation.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// The fault that stopped the machine, if any.
    #[must_use]
    pub const fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// The data stack.
    #[must_use]
    pub const fn data_stack(&self) -> &BoundedStack<i32> {
        &self.data
    }

    /// The instruction (return) stack.
    #[must_use]
    pub const fn instruction_stack(&self) -> &BoundedStack<usize> {
        &self.returns
    }

    /// Program memory.
    #[must_use]
    pub const fn memory(&self) -> &ProgramMemory {
        &self.memory
    }
}
