//! [`ReportSink`] adapter: the three telemetry sinks from component
//! design §4.8 — an appended CSV-ish human log, an overwritten
//! parse-friendly text table, and an overwritten single-line JSON
//! snapshot. All three live under one reporting directory and are
//! reopened/rewritten fresh each tick (overwrite-then-close gives
//! external readers an atomic whole-tick view per the concurrency
//! model's ordering guarantees).

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use serde_json::json;

use crate::domain::ports::ReportSink;
use crate::domain::service::TelemetrySnapshot;

pub struct FileReportSink {
    csv_path: PathBuf,
    table_path: PathBuf,
    json_path: PathBuf,
}

impl FileReportSink {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            csv_path: dir.join("hpmd.csv"),
            table_path: dir.join("hpmd_table.txt"),
            json_path: dir.join("hpmd.json"),
        }
    }
}

impl ReportSink for FileReportSink {
    fn report(&mut self, snapshot: &TelemetrySnapshot) -> std::io::Result<()> {
        self.append_csv(snapshot)?;
        self.write_table(snapshot)?;
        self.write_json(snapshot)
    }
}

impl FileReportSink {
    fn append_csv(&self, s: &TelemetrySnapshot) -> std::io::Result<()> {
        let mut f = OpenOptions::new().create(true).append(true).open(&self.csv_path)?;
        let r = &s.readings;
        writeln!(
            f,
            "{},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{:.3},{},{},{},{},{},{},{},{}",
            s.tick,
            r.ac1_comp, r.ac1_cond, r.he1_in, r.he1_out,
            r.ac2_comp, r.ac2_cond, r.he2_in, r.he2_out,
            r.water_in, r.water_out, r.env,
            s.ac1_mode.label(), s.ac2_mode.label(),
            actuator_bits(s.ac1_actuators), actuator_bits(s.ac2_actuators),
            command_bits(s.command), s.response.bits(),
            s.c1_run_cs, s.c2_run_cs,
        )
    }

    fn write_table(&self, s: &TelemetrySnapshot) -> std::io::Result<()> {
        let r = &s.readings;
        let lines = [
            format!("_,AC1COMP,{:.3}", r.ac1_comp),
            format!("_,AC1COND,{:.3}", r.ac1_cond),
            format!("_,HE1IN,{:.3}", r.he1_in),
            format!("_,HE1OUT,{:.3}", r.he1_out),
            format!("_,AC2COMP,{:.3}", r.ac2_comp),
            format!("_,AC2COND,{:.3}", r.ac2_cond),
            format!("_,HE2IN,{:.3}", r.he2_in),
            format!("_,HE2OUT,{:.3}", r.he2_out),
            format!("_,WATERIN,{:.3}", r.water_in),
            format!("_,WATEROUT,{:.3}", r.water_out),
            format!("_,ENV,{:.3}", r.env),
            format!("_,AC1MODE,{}", s.ac1_mode.label()),
            format!("_,AC2MODE,{}", s.ac2_mode.label()),
            format!("_,AC1BITS,{}", actuator_bits(s.ac1_actuators)),
            format!("_,AC2BITS,{}", actuator_bits(s.ac2_actuators)),
            format!("_,COMMAND,{}", command_bits(s.command)),
            format!("_,RESPONSE,{}", s.response.bits()),
            format!("_,C1RUNCS,{}", s.c1_run_cs),
            format!("_,C2RUNCS,{}", s.c2_run_cs),
        ];
        fs::write(&self.table_path, lines.join("\n") + "\n")
    }

    fn write_json(&self, s: &TelemetrySnapshot) -> std::io::Result<()> {
        let r = &s.readings;
        let value = json!({
            "tick": s.tick,
            "ac1_comp": r.ac1_comp,
            "ac1_cond": r.ac1_cond,
            "he1_in": r.he1_in,
            "he1_out": r.he1_out,
            "ac2_comp": r.ac2_comp,
            "ac2_cond": r.ac2_cond,
            "he2_in": r.he2_in,
            "he2_out": r.he2_out,
            "water_in": r.water_in,
            "water_out": r.water_out,
            "env": r.env,
            "ac1_mode": s.ac1_mode.label(),
            "ac2_mode": s.ac2_mode.label(),
            "ac1_bits": actuator_bits(s.ac1_actuators),
            "ac2_bits": actuator_bits(s.ac2_actuators),
            "command": command_bits(s.command),
            "response": s.response.bits(),
            "c1_run_cs": s.c1_run_cs,
            "c2_run_cs": s.c2_run_cs,
        });
        fs::write(&self.json_path, value.to_string())
    }
}

fn actuator_bits(a: crate::domain::unit::ActuatorState) -> u8 {
    (a.compressor as u8) | (a.fan as u8) << 1 | (a.valve as u8) << 2
}

fn command_bits(c: crate::domain::CommandWord) -> u8 {
    use crate::domain::CommandWord::*;
    match c {
        Idle => 0,
        Low => 1,
        High => 2,
        Battery => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sensors::Readings;
    use crate::domain::unit::{ActuatorState, Mode};
    use crate::domain::{CommandWord, ResponseWord};

    fn sample() -> TelemetrySnapshot {
        TelemetrySnapshot {
            tick: 100,
            readings: Readings {
                ac1_comp: 30.0,
                ac1_cond: 5.0,
                he1_in: 35.0,
                he1_out: 32.0,
                ac2_comp: 29.0,
                ac2_cond: 4.0,
                he2_in: 36.0,
                he2_out: 33.0,
                water_in: 40.0,
                water_out: 45.0,
                env: 10.0,
            },
            ac1_mode: Mode::FinStackHeating,
            ac2_mode: Mode::Off,
            ac1_actuators: ActuatorState {
                compressor: true,
                fan: true,
                valve: true,
            },
            ac2_actuators: ActuatorState::all_off(),
            command: CommandWord::Low,
            response: ResponseWord(1),
            c1_run_cs: 120,
            c2_run_cs: 0,
        }
    }

    #[test]
    fn writes_all_three_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FileReportSink::new(dir.path().to_path_buf());
        sink.report(&sample()).unwrap();
        sink.report(&sample()).unwrap();

        let csv = fs::read_to_string(dir.path().join("hpmd.csv")).unwrap();
        assert_eq!(csv.lines().count(), 2, "csv appends across ticks");

        let table = fs::read_to_string(dir.path().join("hpmd_table.txt")).unwrap();
        assert!(table.contains("_,AC1MODE,FIN-STACK-HEATING"));

        let json = fs::read_to_string(dir.path().join("hpmd.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["tick"], 100);
        assert_eq!(parsed["ac1_bits"], 7);
    }
}
