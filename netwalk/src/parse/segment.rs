//! Splitting a discovery transcript into per-command sections.

use log::debug;

/// One expected command and the transcript lines that belong to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// The command as typed.
    pub command: String,

    /// Every line the command echo was found on.
    pub linefound: Vec<usize>,

    /// First echo line, if found.
    pub startline: Option<usize>,

    /// First line after the section (exclusive).
    pub stopline: Option<usize>,

    /// Lines strictly between the echo and the next command's echo.
    pub sectionoutput: Vec<String>,
}

impl CommandOutput {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// True when `line` echoes this command, and not a longer command that
    /// starts with it.
    pub fn check_match(&self, line: &str) -> bool {
        if self.command.is_empty() {
            return false;
        }
        line.match_indices(self.command.as_str())
            .any(|(at, _)| !line[at + self.command.len()..].starts_with(' '))
    }
}

/// Result of segmenting one transcript.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    /// Sections in expected-command order.
    pub commands: Vec<CommandOutput>,

    /// Number of commands whose echo was found.
    pub successcount: usize,

    /// Too few commands were found for the pull to be trusted.
    pub badpull: bool,
}

impl Segmentation {
    /// Section lines for a command. Unmatched or unknown commands give an
    /// empty slice.
    pub fn section(&self, command: &str) -> &[String] {
        self.commands
            .iter()
            .find(|c| c.command == command)
            .map(|c| c.sectionoutput.as_slice())
            .unwrap_or(&[])
    }

    /// True when the command's echo was located.
    pub fn found(&self, command: &str) -> bool {
        self.commands
            .iter()
            .any(|c| c.command == command && c.startline.is_some())
    }
}

/// Locate every expected command in `lines` and cut the sections.
///
/// Sections run from the line after a command's first echo up to the next
/// echo by position, or to the end of the transcript for the last one.
pub fn segment(lines: &[String], commands: &[String]) -> Segmentation {
    let mut outputs: Vec<CommandOutput> = commands.iter().map(CommandOutput::new).collect();

    for output in outputs.iter_mut() {
        output.linefound = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| output.check_match(line))
            .map(|(i, _)| i)
            .collect();
        output.startline = output.linefound.first().copied();
        if output.linefound.len() > 1 {
            debug!(
                "found multiline matches for '{}' : {:?}",
                output.command, output.linefound
            );
        }
    }

    let mut order: Vec<usize> = (0..outputs.len())
        .filter(|&i| outputs[i].startline.is_some())
        .collect();
    order.sort_by_key(|&i| outputs[i].startline);

    for (n, &idx) in order.iter().enumerate() {
        let Some(start) = outputs[idx].startline else {
            continue;
        };
        let stop = order
            .get(n + 1)
            .and_then(|&next| outputs[next].startline)
            .unwrap_or(lines.len());
        outputs[idx].stopline = Some(stop);
        outputs[idx].sectionoutput = lines
            .get(start + 1..stop.max(start + 1))
            .unwrap_or(&[])
            .to_vec();
        debug!(
            "for '{}' grabbed lines = {}",
            outputs[idx].command,
            outputs[idx].sectionoutput.len()
        );
    }

    let successcount = order.len();
    let badpull = successcount + 1 < commands.len();
    debug!(
        "segmented {} of {} commands, badpull = {}",
        successcount,
        commands.len(),
        badpull
    );

    Segmentation {
        commands: outputs,
        successcount,
        badpull,
    }
}
