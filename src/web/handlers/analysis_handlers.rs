// src/web/handlers/analysis_handlers.rs
use super::analysis_error;
use crate::analysis::profile::{MATCHING_ANALYZER, PROFILE_ANALYZER, SKILLS_ANALYZER};
use crate::analysis::{
    AnalysisError, AnalysisInput, AnalyzerSet, ProfileSummary, ProfileSummaryInput, SkillsReport,
};
use crate::web::types::{
    AnalysisData, ApiResult, DataResponse, ProfileSummaryData, SkillsReportData,
    SkillsReportRequest, StandardRequest, WithConversationId,
};
use chrono::Utc;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{info, warn};

pub async fn analyze_handler(
    request: Json<StandardRequest<AnalysisInput>>,
    profile: Option<String>,
    analyzers: &State<AnalyzerSet>,
) -> ApiResult<DataResponse<AnalysisData>> {
    let conversation_id = request.conversation_id();
    let requested = profile.unwrap_or_else(|| PROFILE_ANALYZER.to_string());
    if analyzers.get(&requested).is_none() {
        warn!("Unknown analyzer profile '{}', using the default", requested);
    }

    let analyzer = analyzers.get_or_default(&requested);
    let result = analyzer
        .analyze(&request.data)
        .map_err(|e| analysis_error(e, conversation_id.clone()))?;

    info!(
        "Analyzed profile with '{}': {} skills, level {}",
        analyzer.profile().name,
        result.skills.len(),
        result.level
    );

    Ok(Json(DataResponse::success(
        format!("Found {} skills", result.skills.len()),
        AnalysisData {
            analyzer: analyzer.profile().name.clone(),
            result,
            analyzed_at: Utc::now(),
        },
        conversation_id,
    )))
}

pub async fn skills_report_handler(
    request: Json<StandardRequest<SkillsReportRequest>>,
    analyzers: &State<AnalyzerSet>,
) -> ApiResult<DataResponse<SkillsReportData>> {
    let conversation_id = request.conversation_id();
    let text = request.data.text.as_deref().unwrap_or_default();

    let report = SkillsReport::build(
        analyzers.get_or_default(SKILLS_ANALYZER),
        text,
        request.data.kind,
    )
    .map_err(|e| analysis_error(e, conversation_id.clone()))?;

    info!("Skills report found {} skills", report.total_skills_found);

    Ok(Json(DataResponse::success(
        format!("Found {} skills", report.total_skills_found),
        SkillsReportData {
            report,
            analyzed_at: Utc::now(),
        },
        conversation_id,
    )))
}

pub async fn profile_summary_handler(
    request: Json<StandardRequest<ProfileSummaryInput>>,
    analyzers: &State<AnalyzerSet>,
) -> ApiResult<DataResponse<ProfileSummaryData>> {
    let conversation_id = request.conversation_id();

    if request.data.name.trim().is_empty() || request.data.email.trim().is_empty() {
        return Err(analysis_error(
            AnalysisError::InvalidInput("Name and email are required".to_string()),
            conversation_id,
        ));
    }

    let summary = ProfileSummary::build(analyzers.get_or_default(MATCHING_ANALYZER), &request.data)
        .map_err(|e| analysis_error(e, conversation_id.clone()))?;

    info!(
        "Profile summary for {}: {} ({} skills)",
        request.data.email,
        summary.level,
        summary.skills.len()
    );

    Ok(Json(DataResponse::success(
        format!("Profile summary for {}", request.data.name.trim()),
        ProfileSummaryData {
            summary,
            analyzed_at: Utc::now(),
        },
        conversation_id,
    )))
}
