use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use simsweep_core::errors::SweepError;
use simsweep_core::{ConfigurationRecord, SequenceIndex, Workload};

use crate::naming::RunNamer;
use crate::template::{CompiledTemplate, InvocationTemplate, SlotContext};

/// Line appended to every run script so a failing simulator is reported
/// without stopping the batch.
pub const EXIT_CHECK: &str = r#"[ $? -eq 0 ] || echo "Error: App did not exit normally""#;

/// Fully resolved description of one simulator invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub name: String,
    pub sequence: SequenceIndex,
    pub configuration: ConfigurationRecord,
    pub workload: Workload,
    /// Simulator argv, first element being the simulator itself.
    pub arguments: Vec<String>,
    pub working_dir: String,
    pub output_path: PathBuf,
    pub script_text: String,
}

impl RunSpec {
    pub fn script_file_name(&self) -> String {
        format!("{}.sh", self.name)
    }
}

/// Turns finalized configuration records into [`RunSpec`]s.
#[derive(Debug, Clone)]
pub struct RunSpecBuilder {
    template: CompiledTemplate,
    namer: RunNamer,
    output_dir: PathBuf,
    preamble: Vec<String>,
}

impl RunSpecBuilder {
    pub fn new(
        template: &InvocationTemplate,
        namer: RunNamer,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, SweepError> {
        Ok(Self {
            template: template.compile()?,
            namer,
            output_dir: output_dir.into(),
            preamble: Vec::new(),
        })
    }

    /// Lines placed between the shebang and the command, e.g. batch
    /// scheduler directives for one host.
    pub fn with_preamble(mut self, preamble: Vec<String>) -> Self {
        self.preamble = preamble;
        self
    }

    pub fn namer(&self) -> &RunNamer {
        &self.namer
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn build(
        &self,
        sequence: SequenceIndex,
        configuration: ConfigurationRecord,
        workload: &Workload,
    ) -> Result<RunSpec, SweepError> {
        let name = self.namer.name_for(workload, sequence)?;
        let output_path = self.output_dir.join(&name);
        let context = SlotContext::new(&configuration)
            .with_reserved("workload", workload.as_str())
            .with_reserved("run_name", name.clone())
            .with_reserved("output_path", output_path.display().to_string())
            .with_reserved("output_dir", self.output_dir.display().to_string())
            .with_reserved("sequence", sequence.to_string());

        let template = &self.template;
        let mut arguments = vec![
            template.simulator.render(&context)?,
            template.conf_flag.clone(),
            template.conf_file.render(&context)?,
        ];
        let mut override_lines = Vec::with_capacity(template.overrides.len());
        for (key, value) in &template.overrides {
            let expr = format!("{} = {};", key.render(&context)?, value.render(&context)?);
            override_lines.push(format!("{} {}", template.override_flag, shell_quote(&expr)));
            arguments.push(template.override_flag.clone());
            arguments.push(expr);
        }
        let trailing = template
            .trailing_args
            .iter()
            .map(|arg| arg.render(&context))
            .collect::<Result<Vec<_>, _>>()?;
        arguments.extend(trailing.iter().cloned());
        let working_dir = template.working_dir.render(&context)?;

        let script_text = render_script(
            &self.preamble,
            &working_dir,
            &arguments[..3],
            &override_lines,
            &trailing,
            &output_path,
        );

        Ok(RunSpec {
            name,
            sequence,
            configuration,
            workload: workload.clone(),
            arguments,
            working_dir,
            output_path,
            script_text,
        })
    }
}

fn render_script(
    preamble: &[String],
    working_dir: &str,
    head: &[String],
    override_lines: &[String],
    trailing: &[String],
    output_path: &Path,
) -> String {
    let mut script = String::from("#!/bin/bash\n");
    for line in preamble {
        script.push_str(line);
        script.push('\n');
    }
    script.push('\n');
    script.push_str(&format!("cd {}\n", shell_quote(working_dir)));
    let head: Vec<String> = head.iter().map(|arg| shell_quote(arg)).collect();
    script.push_str(&head.join(" "));
    for line in override_lines {
        script.push_str(" \\\n    ");
        script.push_str(line);
    }
    script.push_str(" \\\n    ");
    let tail: Vec<String> = trailing.iter().map(|arg| shell_quote(arg)).collect();
    if !tail.is_empty() {
        script.push_str(&tail.join(" "));
        script.push(' ');
    }
    script.push_str(&format!("> {}\n", shell_quote(&output_path.display().to_string())));
    script.push_str(EXIT_CHECK);
    script.push('\n');
    script
}

/// Quotes `arg` for bash. Plain words pass through; anything else is
/// double-quoted with `\`, `"`, `$` and backtick escaped.
pub fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./,:=+@%".contains(ch));
    if plain {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for ch in arg.chars() {
        if matches!(ch, '\\' | '"' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
