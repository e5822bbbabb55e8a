pub mod backend;
pub mod dataset_service;
pub mod model_service;
pub mod system_service;
pub mod tabular;

pub use backend::{ApiRequest, ApiResponse, ApiTransport, HttpTransport};
pub use dataset_service::DatasetService;
pub use model_service::ModelService;
pub use system_service::SystemService;
pub use tabular::{Table, TablePreview};
