use emi_core::{AmortizationResult, EmiError};
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;

/// Convert an engine error into a napi::Error whose reason is the JSON
/// error body `{ "error": ..., "message": ... }`.
fn to_napi_error(e: EmiError) -> napi::Error {
    let body = serde_json::to_string(&e.to_response()).unwrap_or_else(|_| e.to_string());
    napi::Error::from_reason(body)
}

/// Parse request JSON; malformed or non-numeric fields are `InvalidInput`.
fn parse<T: DeserializeOwned>(input_json: &str) -> Result<T, EmiError> {
    serde_json::from_str(input_json).map_err(|e| EmiError::InvalidInput {
        field: "request".into(),
        reason: e.to_string(),
    })
}

fn to_json(value: &impl serde::Serialize) -> NapiResult<String> {
    serde_json::to_string(value).map_err(|e| to_napi_error(e.into()))
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

/// `{ principal, annualRate, tenureMonths, config? }` → `AmortizationResult`
#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let input = emi_core::EmiInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = emi_core::compute_schedule_with(&input.terms, &input.effective_config())
        .map_err(to_napi_error)?;
    to_json(&output)
}

/// Same request as `computeSchedule`, wrapped in the computation envelope.
#[napi]
pub fn calculate_emi(input_json: String) -> NapiResult<String> {
    let input = emi_core::EmiInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = emi_core::calculate_emi(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeBindingInput {
    #[serde(flatten)]
    result: AmortizationResult,
    #[serde(default = "default_group_size")]
    group_size: usize,
}

fn default_group_size() -> usize {
    emi_core::amortization::summary::YEARLY_GROUP
}

/// `{ ...AmortizationResult, groupSize? }` → summary rows
#[napi]
pub fn summarize_schedule(input_json: String) -> NapiResult<String> {
    let input: SummarizeBindingInput = parse(&input_json).map_err(to_napi_error)?;
    let rows = emi_core::summarize(&input.result.schedule, input.group_size)
        .map_err(to_napi_error)?;
    to_json(&rows)
}

// ---------------------------------------------------------------------------
// Affordability
// ---------------------------------------------------------------------------

/// `{ installment, annualRate, tenureMonths, config? }` → affordable principal
#[napi]
pub fn max_principal(input_json: String) -> NapiResult<String> {
    let input: emi_core::AffordabilityInput = parse(&input_json).map_err(to_napi_error)?;
    let output = emi_core::max_principal(&input).map_err(to_napi_error)?;
    to_json(&output)
}
