//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Evaluation, Phase, SentenceSegment, Worksheet};
use crate::scoring::EvaluationReport;
use crate::segment::AnnotatedRun;

/// Inbound worksheet payload from the generation collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorksheetPayload {
    pub sentences: Vec<SentenceIn>,
    #[serde(rename = "wordBank")]
    pub word_bank: Vec<String>,
    #[serde(default)]
    pub bilingual: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SentenceIn {
    pub template: String,
    pub answer: String,
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NewWorksheet {
        name: Option<String>,
    },
    LoadWorksheet {
        payload: WorksheetPayload,
    },
    Snapshot {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
    },
    Assign {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
        #[serde(rename = "wordId")]
        word_id: u32,
        #[serde(rename = "blankId")]
        blank_id: String,
    },
    Unassign {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
        #[serde(rename = "blankId")]
        blank_id: String,
    },
    ReorderPool {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
        #[serde(rename = "fromIndex")]
        from_index: usize,
        #[serde(rename = "toIndex")]
        to_index: usize,
    },
    MoveWord {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
        #[serde(rename = "sourceBlankId")]
        source_blank_id: String,
        #[serde(rename = "destBlankId")]
        dest_blank_id: String,
    },
    Evaluate {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
    },
    Discard {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
    },
    SegmentInput {
        text: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Worksheet {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
        worksheet: WorksheetOut,
    },
    Evaluation {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
        report: EvaluationReport,
    },
    Discarded {
        #[serde(rename = "worksheetId")]
        worksheet_id: String,
    },
    Segments {
        text: String,
        runs: Vec<AnnotatedRun>,
    },
    Error {
        message: String,
    },
}

/// Read-only snapshot of a worksheet session, used by both WS and HTTP.
#[derive(Debug, Serialize)]
pub struct WorksheetOut {
    pub sentences: Vec<SentenceOut>,
    pub pool: Vec<WordOut>,
    pub bilingual: bool,
    pub phase: Phase,
    #[serde(rename = "lastReport", skip_serializing_if = "Option::is_none")]
    pub last_report: Option<EvaluationReport>,
}

#[derive(Debug, Serialize)]
pub struct SentenceOut {
    pub segments: Vec<SegmentOut>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmentOut {
    Literal {
        text: String,
    },
    Blank {
        #[serde(rename = "blankId")]
        blank_id: String,
        expected: String,
        assigned: Option<WordOut>,
        evaluation: Evaluation,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct WordOut {
    #[serde(rename = "wordId")]
    pub word_id: u32,
    pub text: String,
}

/// Convert the internal `Worksheet` to the public snapshot DTO.
pub fn to_out(ws: &Worksheet, last_report: Option<&EvaluationReport>) -> WorksheetOut {
    let sentences = ws
        .sentences
        .iter()
        .map(|sentence| SentenceOut {
            segments: sentence
                .segments
                .iter()
                .map(|seg| match seg {
                    SentenceSegment::Literal(text) => SegmentOut::Literal { text: text.clone() },
                    SentenceSegment::Blank(slot) => SegmentOut::Blank {
                        blank_id: slot.id.to_string(),
                        expected: slot.expected.clone(),
                        assigned: slot.assigned.as_ref().map(|w| WordOut {
                            word_id: w.id.0,
                            text: w.text.clone(),
                        }),
                        evaluation: slot.last_eval,
                    },
                })
                .collect(),
        })
        .collect();

    WorksheetOut {
        sentences,
        pool: ws
            .pool
            .iter()
            .map(|w| WordOut { word_id: w.id.0, text: w.text.clone() })
            .collect(),
        bilingual: ws.bilingual,
        phase: ws.phase,
        last_report: last_report.cloned(),
    }
}

//
// HTTP request/response DTOs
//

/// Body of `POST /api/v1/worksheet`: either an explicit payload, or a bank
/// worksheet by name (or a random one if neither is given).
#[derive(Debug, Deserialize)]
pub struct CreateWorksheetIn {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub payload: Option<WorksheetPayload>,
}

#[derive(Debug, Serialize)]
pub struct CreateWorksheetOut {
    #[serde(rename = "worksheetId")]
    pub worksheet_id: String,
    pub worksheet: WorksheetOut,
}

#[derive(Debug, Deserialize)]
pub struct AssignIn {
    #[serde(rename = "wordId")]
    pub word_id: u32,
    #[serde(rename = "blankId")]
    pub blank_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UnassignIn {
    #[serde(rename = "blankId")]
    pub blank_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderIn {
    #[serde(rename = "fromIndex")]
    pub from_index: usize,
    #[serde(rename = "toIndex")]
    pub to_index: usize,
}

#[derive(Debug, Deserialize)]
pub struct MoveIn {
    #[serde(rename = "sourceBlankId")]
    pub source_blank_id: String,
    #[serde(rename = "destBlankId")]
    pub dest_blank_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SegmentIn {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct SegmentsOut {
    pub runs: Vec<AnnotatedRun>,
}

#[derive(Debug, Serialize)]
pub struct BankOut {
    pub worksheets: Vec<String>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}
