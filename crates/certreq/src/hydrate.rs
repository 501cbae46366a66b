use crate::alt_names::parse_alt_names;
use crate::api::{CertificateApi, CertificateDetail, non_empty};
use crate::types::Certificate;

/// Enrich `target` with subject, validity and algorithm detail.
///
/// Best effort: the certificate is already issued, so a failed detail fetch
/// is logged and leaves the detail fields as they were.
pub async fn hydrate(api: &dyn CertificateApi, certificate_id: &str, target: &mut Certificate) {
    match api.certificate_detail(certificate_id).await {
        Ok(detail) => apply_detail(&detail, target),
        Err(e) => {
            tracing::warn!(
                certificate_id = %certificate_id,
                "certificate detail unavailable, returning partial record: {e}"
            );
        }
    }
}

/// Copy populated detail fields into `target`. Alt names are replaced only
/// when the detail carries them; otherwise a never-fetched list becomes empty.
pub(crate) fn apply_detail(detail: &CertificateDetail, target: &mut Certificate) {
    overwrite(&mut target.common_name, &detail.common_name);
    overwrite(&mut target.key_algorithm, &detail.key_algorithm);
    overwrite(&mut target.signature_algorithm, &detail.signature_algorithm);
    overwrite(&mut target.not_before, &detail.not_before);
    overwrite(&mut target.not_after, &detail.not_after);
    overwrite(&mut target.certificate_chain, &detail.certificate_chain);
    if detail.alt_names.is_some() {
        target.alt_names = Some(parse_alt_names(detail.alt_names.as_ref()));
    } else if target.alt_names.is_none() {
        target.alt_names = Some(Vec::new());
    }
}

fn overwrite(field: &mut String, value: &Option<String>) {
    if let Some(value) = non_empty(value) {
        value.clone_into(field);
    }
}
