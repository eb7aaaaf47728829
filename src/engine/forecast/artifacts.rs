// ==========================================
// 零售分析驾驶舱 - 模型产物注册表
// ==========================================
// 职责: 模型 + 编码器 的惰性加载与进程内共享
// 并发: 首次请求在锁内加载, 之后只读共享 Arc<LoadedArtifacts>
// 失败: 加载失败不缓存, 下次请求重试 (产物可能在进程运行期间补齐)
// ==========================================

use crate::engine::forecast::encoder::EncoderBundle;
use crate::engine::forecast::model::{DemandRegressor, TreeEnsembleRegressor};
use crate::engine::forecast::{ForecastError, ForecastResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 模型文件名
pub const MODEL_FILE: &str = "demand_model.json";
/// 编码器文件名
pub const ENCODERS_FILE: &str = "encoders.json";

// ==========================================
// LoadedArtifacts - 已加载产物
// ==========================================
pub struct LoadedArtifacts {
    pub model: Box<dyn DemandRegressor>,
    pub encoders: EncoderBundle,
}

impl LoadedArtifacts {
    pub fn new(model: Box<dyn DemandRegressor>, encoders: EncoderBundle) -> Self {
        Self { model, encoders }
    }
}

impl std::fmt::Debug for LoadedArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedArtifacts")
            .field("encoders", &self.encoders)
            .finish_non_exhaustive()
    }
}

// ==========================================
// ArtifactLoader Trait
// ==========================================
pub trait ArtifactLoader: Send + Sync {
    fn load(&self) -> ForecastResult<LoadedArtifacts>;
}

/// 从目录读取 demand_model.json / encoders.json
#[derive(Debug, Clone)]
pub struct FileArtifactLoader {
    model_dir: PathBuf,
}

impl FileArtifactLoader {
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    fn read_artifact(&self, file_name: &str) -> ForecastResult<String> {
        let path = self.model_dir.join(file_name);
        std::fs::read_to_string(&path)
            .map_err(|e| ForecastError::ModelUnavailable(format!("{}: {}", path.display(), e)))
    }
}

impl ArtifactLoader for FileArtifactLoader {
    fn load(&self) -> ForecastResult<LoadedArtifacts> {
        let model = TreeEnsembleRegressor::from_json(&self.read_artifact(MODEL_FILE)?)?;
        let encoders: EncoderBundle = serde_json::from_str(&self.read_artifact(ENCODERS_FILE)?)
            .map_err(|e| ForecastError::ModelUnavailable(format!("编码器文件解析失败: {}", e)))?;

        info!(
            model_dir = %self.model_dir.display(),
            trees = model.tree_count(),
            regions = encoders.region.len(),
            categories = encoders.category.len(),
            sub_categories = encoders.sub_category.len(),
            "预测模型产物已加载"
        );
        Ok(LoadedArtifacts::new(Box::new(model), encoders))
    }
}

// ==========================================
// ModelRegistry - 产物注册表
// ==========================================
pub struct ModelRegistry {
    loader: Box<dyn ArtifactLoader>,
    cached: Mutex<Option<Arc<LoadedArtifacts>>>,
    load_count: AtomicUsize,
}

impl ModelRegistry {
    /// 以文件目录为产物来源
    pub fn from_dir(model_dir: impl Into<PathBuf>) -> Self {
        Self::with_loader(Box::new(FileArtifactLoader::new(model_dir)))
    }

    /// 注入自定义加载器
    pub fn with_loader(loader: Box<dyn ArtifactLoader>) -> Self {
        Self {
            loader,
            cached: Mutex::new(None),
            load_count: AtomicUsize::new(0),
        }
    }

    /// 以已加载产物构造（不再触发加载）
    pub fn preloaded(artifacts: LoadedArtifacts) -> Self {
        Self {
            loader: Box::new(Unavailable),
            cached: Mutex::new(Some(Arc::new(artifacts))),
            load_count: AtomicUsize::new(0),
        }
    }

    /// 获取产物（首次调用时加载）
    pub fn get(&self) -> ForecastResult<Arc<LoadedArtifacts>> {
        let mut guard = self
            .cached
            .lock()
            .map_err(|e| ForecastError::Inference(format!("产物缓存锁获取失败: {}", e)))?;

        if let Some(artifacts) = guard.as_ref() {
            return Ok(Arc::clone(artifacts));
        }

        self.load_count.fetch_add(1, Ordering::SeqCst);
        match self.loader.load() {
            Ok(artifacts) => {
                let artifacts = Arc::new(artifacts);
                *guard = Some(Arc::clone(&artifacts));
                Ok(artifacts)
            }
            Err(e) => {
                warn!(error = %e, "预测模型产物加载失败");
                Err(e)
            }
        }
    }

    /// 已尝试加载次数
    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.lock().map(|g| g.is_some()).unwrap_or(false)
    }
}

/// 预加载注册表的占位加载器
struct Unavailable;

impl ArtifactLoader for Unavailable {
    fn load(&self) -> ForecastResult<LoadedArtifacts> {
        Err(ForecastError::ModelUnavailable("未配置产物来源".to_string()))
    }
}
