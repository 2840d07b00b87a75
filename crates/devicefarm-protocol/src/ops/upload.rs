//! CreateUpload and GetUpload.

use serde::{Deserialize, Serialize};

use crate::model::{Upload, UploadType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUploadRequest {
    pub project_arn: String,
    /// File name of the artifact, including its extension.
    pub name: String,
    #[serde(rename = "type")]
    pub upload_type: UploadType,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUploadResponse {
    pub upload: Upload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUploadRequest {
    pub arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUploadResponse {
    pub upload: Upload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_upload_body() {
        let request = CreateUploadRequest {
            project_arn: "arn:project".to_string(),
            name: "app.ipa".to_string(),
            upload_type: UploadType::IosApp,
            content_type: crate::OCTET_STREAM.to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "projectArn": "arn:project",
                "name": "app.ipa",
                "type": "IOS_APP",
                "contentType": "application/octet-stream"
            })
        );
    }
}
