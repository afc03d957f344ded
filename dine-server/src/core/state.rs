use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::api::rate_limit::RateLimiter;
use crate::auth::JwtService;
use crate::catalog::SqliteCatalog;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::{OrderManager, SequenceGenerator, SqliteLedger};
use crate::realtime::RoomHub;
use crate::tables::{SqliteTableCoordinator, TableCoordinator};
use crate::utils::AppResult;

/// Rate limiter entries are swept this often
const RATE_LIMIT_SWEEP: Duration = Duration::from_secs(60);

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一份。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | hub | 实时房间广播 |
/// | tables | 餐桌状态协调 |
/// | orders | 订单生命周期 |
/// | jwt_service | JWT 认证服务 |
/// | rate_limiter | 扫码下单限流 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub hub: RoomHub,
    pub tables: Arc<dyn TableCoordinator>,
    pub orders: Arc<OrderManager>,
    pub jwt_service: Arc<JwtService>,
    pub rate_limiter: RateLimiter,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("hub", &self.hub)
            .field("orders", &self.orders)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 工作目录
    /// 2. 数据库 (迁移)
    /// 3. 各服务
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir()
            .map_err(|e| crate::AppError::internal(format!("Failed to create work dir: {e}")))?;
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::with_db(config.clone(), db))
    }

    /// Wire the services on top of an open database
    pub fn with_db(config: Config, db: DbService) -> Self {
        let pool = db.pool.clone();
        let hub = RoomHub::new();
        let tables: Arc<dyn TableCoordinator> = Arc::new(SqliteTableCoordinator::new(pool.clone()));
        let sequence = SequenceGenerator::new(Arc::new(SqliteLedger::new(pool.clone())), config.sequence);
        let orders = Arc::new(OrderManager::new(
            pool.clone(),
            tables.clone(),
            Arc::new(SqliteCatalog::new(pool)),
            Arc::new(hub.clone()),
            sequence,
            config.timezone,
        ));
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            db,
            hub,
            tables,
            orders,
            jwt_service,
            rate_limiter: RateLimiter::new(),
        }
    }

    /// 启动后台任务 (限流表清理)
    pub fn start_background_tasks(&self, shutdown: CancellationToken) {
        let limiter = self.rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(RATE_LIMIT_SWEEP);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = interval.tick() => limiter.cleanup().await,
                }
            }
            tracing::debug!("Rate limiter sweep stopped");
        });
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt_service
    }

    pub fn pool(&self) -> &sqlx::SqlitePool {
        &self.db.pool
    }
}
