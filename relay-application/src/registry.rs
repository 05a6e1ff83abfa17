//! 处理器注册表（CommandHandlerRegistry）
//!
//! 由宿主在组装期构建：以 `TypeId` 为键登记类型擦除后的处理器调用闭包，
//! 每个命令类型至多绑定一个处理器。调度器只做查找与调用，从不自行构造处理器。
//!
use crate::{
    command::Command, command_handler::CommandHandler, context::DispatchContext, error::AppError,
};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type BoxAnySend = Box<dyn Any + Send>;

type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<BoxAnySend, AppError>> + Send + 'a>>;

pub(crate) type HandlerFn =
    Arc<dyn for<'a> Fn(BoxAnySend, &'a DispatchContext) -> HandlerFuture<'a> + Send + Sync>;

/// 类型键控的处理器注册表
pub struct CommandHandlerRegistry {
    handlers: DashMap<TypeId, (&'static str, HandlerFn)>,
}

impl Default for CommandHandlerRegistry {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl CommandHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器
    ///
    /// 同一命令类型的重复注册返回 [`AppError::AlreadyRegistered`]
    /// （每个命令类型至多一个处理器）。
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + Send + Sync + 'static,
    {
        let key = TypeId::of::<C>();

        if self.handlers.contains_key(&key) {
            return Err(AppError::AlreadyRegistered { command: C::NAME });
        }

        let f: HandlerFn = {
            let handler = handler.clone();

            Arc::new(move |boxed_cmd, ctx| {
                let handler = handler.clone();

                Box::pin(async move {
                    // 正常情况下这里的 downcast 永远不会失败（键与闭包同一泛型 C）
                    match boxed_cmd.downcast::<C>() {
                        Ok(cmd) => {
                            let output = handler.handle(ctx, *cmd).await?;
                            Ok(Box::new(output) as BoxAnySend)
                        }
                        Err(_) => Err(AppError::TypeMismatch {
                            expected: C::NAME,
                            found: "unknown",
                        }),
                    }
                })
            })
        };

        self.handlers.insert(key, (C::NAME, f));

        Ok(())
    }

    /// 解析某命令类型的调用闭包；未注册返回 `None`
    pub(crate) fn resolve(&self, key: TypeId) -> Option<HandlerFn> {
        self.handlers.get(&key).map(|e| e.value().1.clone())
    }

    /// 某命令类型是否已绑定处理器
    pub fn contains<C: Command>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<C>())
    }

    /// 获取已注册的命令类型名列表（只读视图）
    pub fn registered_commands(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|e| e.value().0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Noop;
    impl Command for Noop {
        const NAME: &'static str = "Noop";
        type Output = ();
    }

    struct NoopHandler;

    #[async_trait]
    impl CommandHandler<Noop> for NoopHandler {
        async fn handle(&self, _ctx: &DispatchContext, _cmd: Noop) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = CommandHandlerRegistry::new();

        registry
            .register::<Noop, _>(Arc::new(NoopHandler))
            .expect("first registration");

        let err = registry
            .register::<Noop, _>(Arc::new(NoopHandler))
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AlreadyRegistered { command: "Noop" }
        ));

        assert!(registry.contains::<Noop>());
        assert_eq!(registry.registered_commands(), vec!["Noop"]);
    }
}
