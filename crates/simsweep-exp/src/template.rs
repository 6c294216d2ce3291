use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use simsweep_core::errors::{ErrorInfo, SweepError};
use simsweep_core::ConfigurationRecord;

/// Slot names filled by the builder rather than by configuration fields.
pub const RESERVED_SLOTS: [&str; 5] = ["workload", "run_name", "output_path", "output_dir", "sequence"];

/// One `key = value;` override handed to the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfOverride {
    pub key: String,
    pub value: String,
}

impl ConfOverride {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Built-in override lists for known simulator setups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverridePreset {
    /// One SMTSIM core, one hardware context, private L2 and a shared L3,
    /// with the per-core queue, register, cache and width fields exposed
    /// as slots.
    SmtsimSingleCore,
}

impl OverridePreset {
    pub fn overrides(&self) -> Vec<ConfOverride> {
        match self {
            OverridePreset::SmtsimSingleCore => smtsim_single_core(),
        }
    }
}

const STAT_MASKS: [&str; 30] = [
    "cyc", "commits", "l3cache_hr", "mem_delay", "itlb_acc", "dtlb_acc", "icache_acc",
    "dcache_acc", "l2cache_acc", "l3cache_acc", "bpred_acc", "fpalu_acc", "intalu_acc",
    "ldst_acc", "lsq_acc", "iq_acc", "fq_acc", "ireg_acc", "freg_acc", "iren_acc", "fren_acc",
    "rob_acc", "lsq_occ", "iq_occ", "fq_occ", "ireg_occ", "freg_occ", "iren_occ", "fren_occ",
    "rob_occ",
];

fn smtsim_single_core() -> Vec<ConfOverride> {
    let mut list = vec![
        ConfOverride::new("Syscall/root_paths_at_cwd", "t"),
        ConfOverride::new("Syscall/ForceUniqueNames", r#"{ "fort.11"; }"#),
        ConfOverride::new("AppStatsLog/enable", "t"),
        ConfOverride::new("AppStatsLog/interval", "10e3"),
        ConfOverride::new("AppStatsLog/base_name", r#""${output_path}""#),
        ConfOverride::new("AppStatsLog/stat_mask/all", "f"),
    ];
    list.extend(
        STAT_MASKS
            .iter()
            .map(|mask| ConfOverride::new(format!("AppStatsLog/stat_mask/{mask}"), "t")),
    );
    let fixed = [
        ("Workloads/${workload}/ff_dist", "${ff_dist}"),
        (
            "WorkQueue/Jobs/job_1",
            r#"{ start_time = 0.; workload = "${workload}"}"#,
        ),
        ("WorkQueue/max_running_jobs", "1"),
        ("Global/thread_length", "${thread_length}"),
        ("Global/num_cores", "1"),
        ("Global/num_contexts", "1"),
        ("Global/ThreadCoreMap/t0", "0"),
        ("Global/Mem/private_l2caches", "t"),
        ("Global/Mem/L2Cache/size_kb", "256"),
        ("Global/Mem/L2Cache/access_time", "{ latency = 10; interval = 2; }"),
        ("Global/Mem/L2Cache/access_time_wb", "{ latency = 10; interval = 2; }"),
        ("Global/Mem/use_l3cache", "t"),
        ("Global/Mem/L3Cache/size_kb", "8192"),
        ("Global/Mem/L3Cache/assoc", "8"),
        ("Global/Mem/L3Cache/access_time", "{ latency = 20; interval = 8; }"),
        ("Global/Mem/L3Cache/access_time_wb", "{ latency = 20; interval = 8; }"),
        ("Global/Mem/MainMem/read_time", "{ latency = 250; interval = 100; }"),
        ("Global/Mem/MainMem/write_time", "{ latency = 250; interval = 100; }"),
        ("Core/ICache/size_kb", "${ics}"),
        ("Core/ICache/assoc", "${ica}"),
        ("Core/ICache/access_time", "{ latency = 2; interval = latency; }"),
        ("Core/ICache/access_time_wb", "{ latency = 3; interval = latency; }"),
        ("Core/DCache/size_kb", "${dcs}"),
        ("Core/DCache/assoc", "${dca}"),
        ("Core/DCache/access_time", "{ latency = 2; interval = latency; }"),
        ("Core/DCache/access_time_wb", "{ latency = 3; interval = latency; }"),
        ("Core/loadstore_queue_size", "${lsq}"),
        ("Core/Queue/int_queue_size", "${iqs}"),
        ("Core/Queue/float_queue_size", "${fqs}"),
        ("Core/Fetch/single_limit", "${fb}"),
        ("Core/Fetch/total_limit", "${fb}"),
        ("Core/Commit/single_limit", "${mci}"),
        ("Core/Commit/total_limit", "${mci}"),
        ("Core/Queue/max_int_issue", "${mii}"),
        ("Core/Queue/max_float_issue", "${mfi}"),
        ("Core/Queue/max_ldst_issue", "${mli}"),
        ("Core/Rename/int_rename_regs", "${ipr}"),
        ("Core/Rename/float_rename_regs", "${fpr}"),
        ("Thread/reorder_buffer_size", "${rob}"),
        ("Core/Decode/total_limit", "${dec}"),
        ("Thread/active_list_size", "${active_list}"),
        ("ResourcePooling/enable", "f"),
    ];
    list.extend(fixed.into_iter().map(|(key, value)| ConfOverride::new(key, value)));
    list
}

/// Static description of how a configuration becomes a simulator command
/// line. Every string may contain `${slot}` references; `$$` is a literal `$`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationTemplate {
    pub simulator: String,
    #[serde(default = "InvocationTemplate::default_conf_flag")]
    pub conf_flag: String,
    pub conf_file: String,
    pub working_dir: String,
    #[serde(default = "InvocationTemplate::default_override_flag")]
    pub override_flag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<OverridePreset>,
    #[serde(default)]
    pub overrides: Vec<ConfOverride>,
    #[serde(default = "InvocationTemplate::default_trailing_args")]
    pub trailing_args: Vec<String>,
}

impl InvocationTemplate {
    fn default_conf_flag() -> String {
        "-conffile".to_string()
    }

    fn default_override_flag() -> String {
        "-confexpr".to_string()
    }

    fn default_trailing_args() -> Vec<String> {
        vec!["-confdump".to_string(), "-".to_string()]
    }

    /// SMTSIM single-core template rooted at the given installation paths.
    pub fn smtsim_single_core(
        simulator: impl Into<String>,
        conf_file: impl Into<String>,
        working_dir: impl Into<String>,
    ) -> Self {
        Self {
            simulator: simulator.into(),
            conf_flag: Self::default_conf_flag(),
            conf_file: conf_file.into(),
            working_dir: working_dir.into(),
            override_flag: Self::default_override_flag(),
            preset: Some(OverridePreset::SmtsimSingleCore),
            overrides: Vec::new(),
            trailing_args: Self::default_trailing_args(),
        }
    }

    /// Preset overrides followed by explicit ones. An explicit override
    /// whose key matches a preset entry replaces it in place.
    pub fn effective_overrides(&self) -> Vec<ConfOverride> {
        let mut merged = self.preset.map(|preset| preset.overrides()).unwrap_or_default();
        for extra in &self.overrides {
            match merged.iter_mut().find(|existing| existing.key == extra.key) {
                Some(existing) => existing.value = extra.value.clone(),
                None => merged.push(extra.clone()),
            }
        }
        merged
    }

    /// Parses every slot reference once.
    pub fn compile(&self) -> Result<CompiledTemplate, SweepError> {
        let overrides = self
            .effective_overrides()
            .into_iter()
            .map(|entry| Ok((SlotText::parse(&entry.key)?, SlotText::parse(&entry.value)?)))
            .collect::<Result<Vec<_>, SweepError>>()?;
        let trailing_args = self
            .trailing_args
            .iter()
            .map(|arg| SlotText::parse(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledTemplate {
            simulator: SlotText::parse(&self.simulator)?,
            conf_flag: self.conf_flag.clone(),
            conf_file: SlotText::parse(&self.conf_file)?,
            working_dir: SlotText::parse(&self.working_dir)?,
            override_flag: self.override_flag.clone(),
            overrides,
            trailing_args,
        })
    }
}

/// Template with all slot references parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledTemplate {
    pub(crate) simulator: SlotText,
    pub(crate) conf_flag: String,
    pub(crate) conf_file: SlotText,
    pub(crate) working_dir: SlotText,
    pub(crate) override_flag: String,
    pub(crate) overrides: Vec<(SlotText, SlotText)>,
    pub(crate) trailing_args: Vec<SlotText>,
}

impl CompiledTemplate {
    /// Every distinct slot name referenced anywhere in the template.
    pub fn slot_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = [&self.simulator, &self.conf_file, &self.working_dir]
            .into_iter()
            .chain(self.overrides.iter().flat_map(|(key, value)| [key, value]))
            .chain(self.trailing_args.iter())
            .flat_map(SlotText::slots)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// Text with `${name}` slots, parsed into literal and slot segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotText {
    segments: Vec<Segment>,
}

impl SlotText {
    pub fn parse(text: &str) -> Result<Self, SweepError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();
        while let Some((offset, ch)) = chars.next() {
            if ch != '$' {
                literal.push(ch);
                continue;
            }
            match chars.peek() {
                Some((_, '$')) => {
                    chars.next();
                    literal.push('$');
                }
                Some((_, '{')) => {
                    chars.next();
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, inner) in chars.by_ref() {
                        if inner == '}' {
                            closed = true;
                            break;
                        }
                        name.push(inner);
                    }
                    if !closed {
                        return Err(template_error("template.unterminated_slot", text, offset));
                    }
                    if !is_slot_name(&name) {
                        return Err(template_error("template.bad_slot_name", text, offset));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(name));
                }
                _ => literal.push('$'),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(Self { segments })
    }

    pub fn slots(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, context: &SlotContext<'_>) -> Result<String, SweepError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(name) => out.push_str(&context.lookup(name)?),
            }
        }
        Ok(out)
    }
}

fn is_slot_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}

fn template_error(code: &str, text: &str, offset: usize) -> SweepError {
    SweepError::RunSpec(
        ErrorInfo::new(code, "malformed slot reference in invocation template")
            .with_context("text", text.to_string())
            .with_context("offset", offset.to_string())
            .with_hint("write `${field}` for a slot and `$$` for a literal dollar sign"),
    )
}

/// Values available to slots while rendering one run.
#[derive(Debug)]
pub struct SlotContext<'a> {
    record: &'a ConfigurationRecord,
    reserved: BTreeMap<&'static str, String>,
}

impl<'a> SlotContext<'a> {
    pub fn new(record: &'a ConfigurationRecord) -> Self {
        Self {
            record,
            reserved: BTreeMap::new(),
        }
    }

    pub fn with_reserved(mut self, slot: &'static str, value: impl Into<String>) -> Self {
        debug_assert!(RESERVED_SLOTS.contains(&slot));
        self.reserved.insert(slot, value.into());
        self
    }

    pub fn lookup(&self, name: &str) -> Result<String, SweepError> {
        if let Some(value) = self.reserved.get(name) {
            return Ok(value.clone());
        }
        self.record
            .get(name)
            .map(ToString::to_string)
            .ok_or_else(|| {
                SweepError::RunSpec(
                    ErrorInfo::new(
                        "runspec.missing_field",
                        "template references a field absent from the configuration",
                    )
                    .with_context("slot", name.to_string())
                    .with_hint("declare it as an axis or a derived field"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slots_and_escapes() {
        let text = SlotText::parse("a${x}b$$c$?").expect("parse");
        assert_eq!(text.slots().collect::<Vec<_>>(), vec!["x"]);
        let record = ConfigurationRecord::new().with_field("x", 7);
        let rendered = text.render(&SlotContext::new(&record)).expect("render");
        assert_eq!(rendered, "a7b$c$?");
    }

    #[test]
    fn rejects_unterminated_and_empty_slots() {
        let err = SlotText::parse("size ${ics").expect_err("unterminated");
        assert_eq!(err.info().code, "template.unterminated_slot");
        let err = SlotText::parse("${}").expect_err("empty");
        assert_eq!(err.info().code, "template.bad_slot_name");
    }

    #[test]
    fn reserved_slots_shadow_nothing_in_record() {
        let record = ConfigurationRecord::new();
        let context = SlotContext::new(&record).with_reserved("workload", "applu");
        assert_eq!(context.lookup("workload").expect("reserved"), "applu");
        let err = context.lookup("rob").expect_err("missing");
        assert_eq!(err.info().code, "runspec.missing_field");
    }

    #[test]
    fn explicit_overrides_replace_preset_entries() {
        let mut template = InvocationTemplate::smtsim_single_core("smtsim", "w.conf", "/bench");
        template
            .overrides
            .push(ConfOverride::new("Global/Mem/L2Cache/size_kb", "${l2c}"));
        template
            .overrides
            .push(ConfOverride::new("Global/Mem/L2Cache/assoc", "${l2a}"));
        let merged = template.effective_overrides();
        let l2 = merged
            .iter()
            .find(|entry| entry.key == "Global/Mem/L2Cache/size_kb")
            .expect("l2 size");
        assert_eq!(l2.value, "${l2c}");
        assert_eq!(merged.last().map(|entry| entry.key.as_str()), Some("Global/Mem/L2Cache/assoc"));
        let compiled = template.compile().expect("compile");
        let slots = compiled.slot_names();
        assert!(slots.contains(&"l2a"));
        assert!(slots.contains(&"active_list"));
        assert!(slots.contains(&"output_path"));
    }
}
