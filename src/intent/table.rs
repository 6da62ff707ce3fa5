// src/intent/table.rs
// Built-in phrase table. Order matters: earlier entries win score ties.
// A phrase appears in at most one entry.

use super::IntentMapping;

const NO_ARGS: &[(&str, &str)] = &[];
const NONE: &[&str] = &[];

pub static DEFAULT_MAPPINGS: &[IntentMapping] = &[
    // Development environment
    IntentMapping {
        patterns: &[
            "start development", "start dev", "begin development", "start working",
            "launch development", "boot up dev", "fire up development",
            "get development running", "start dev environment", "bring up dev",
            "start", "begin", "launch", "boot", "start the project", "get started",
            "spin up", "fire up", "turn on", "activate development", "initialize",
            "start coding", "start the app", "start the application", "run the project",
        ],
        make_target: "dev-up",
        args: NO_ARGS,
        confirm: false,
        description: "Start the development environment with all services",
        category: "development",
        prerequisites: NONE,
        follow_up: &["dev-status"],
    },
    IntentMapping {
        patterns: &[
            "check status", "status check", "is everything running", "dev status",
            "check services", "service status", "system status", "health check",
            "are services up", "development status", "check if running",
        ],
        make_target: "dev-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check the status of all development services",
        category: "development",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "restart dev", "refresh dev", "reload development", "refresh environment",
            "reset dev environment", "restart development", "refresh services",
        ],
        make_target: "dev-refresh",
        args: NO_ARGS,
        confirm: false,
        description: "Refresh the development environment",
        category: "development",
        prerequisites: &["This will restart all services"],
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "stop development", "stop dev", "shut down dev", "stop services",
            "bring down dev", "stop dev environment", "shutdown development",
        ],
        make_target: "dev-down",
        args: NO_ARGS,
        confirm: false,
        description: "Stop the development environment",
        category: "development",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Database
    IntentMapping {
        patterns: &[
            "run migrations", "apply migrations", "migrate database", "db migrate",
            "update database", "run db migrations", "apply db changes",
        ],
        make_target: "db-migrate",
        args: NO_ARGS,
        confirm: false,
        description: "Apply pending database migrations with automatic backup",
        category: "database",
        prerequisites: &["Database backup will be created automatically"],
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "backup database", "create db backup", "backup db", "save database",
            "database backup", "backup data", "create backup",
        ],
        make_target: "db-backup",
        args: NO_ARGS,
        confirm: false,
        description: "Create a database backup",
        category: "database",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "check migrations", "migration status", "db migration status",
            "pending migrations", "database migration status", "check db migrations",
        ],
        make_target: "db-migrate-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check the status of database migrations",
        category: "database",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "check database", "test db", "verify database", "db health",
            "database connectivity", "check db connection", "test database connection",
        ],
        make_target: "check-db",
        args: NO_ARGS,
        confirm: false,
        description: "Verify database connectivity and health",
        category: "database",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Testing and quality
    IntentMapping {
        patterns: &[
            "run tests", "execute tests", "test code", "run test suite",
            "validate code", "check tests", "testing", "run unit tests",
        ],
        make_target: "test",
        args: NO_ARGS,
        confirm: false,
        description: "Run the complete test suite",
        category: "testing",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "check types", "typecheck", "validate types", "typescript check",
            "type validation", "check typescript",
        ],
        make_target: "typecheck",
        args: NO_ARGS,
        confirm: false,
        description: "Validate TypeScript types across the project",
        category: "testing",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "lint code", "run linter", "check code style", "validate code style",
            "code quality check", "style check", "lint",
        ],
        make_target: "lint",
        args: NO_ARGS,
        confirm: false,
        description: "Check code style and quality with linter",
        category: "testing",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "system health", "validate system",
            "comprehensive check", "full health check", "system validation",
        ],
        make_target: "health",
        args: NO_ARGS,
        confirm: false,
        description: "Comprehensive system health check",
        category: "testing",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Financial
    IntentMapping {
        patterns: &[
            "sync financial data", "update financial", "financial sync",
            "sync from production", "financial data sync",
        ],
        make_target: "financial-sync",
        args: NO_ARGS,
        confirm: true,
        description: "Synchronize financial data from production",
        category: "financial",
        prerequisites: &["Database backup will be created"],
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "validate financial data", "check financial integrity", "financial validation",
            "verify financial data", "audit financial data",
        ],
        make_target: "financial-validate",
        args: NO_ARGS,
        confirm: false,
        description: "Validate financial data integrity",
        category: "financial",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Trading
    IntentMapping {
        patterns: &[
            "start trading", "launch trading", "trading up", "start trading services",
            "enable trading", "boot trading", "trading start",
        ],
        make_target: "trading-up",
        args: NO_ARGS,
        confirm: false,
        description: "Start trading services",
        category: "trading",
        prerequisites: &["API keys must be configured"],
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "trading status", "check trading", "trading health", "trading services status",
            "trading system status",
        ],
        make_target: "trading-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check trading services status",
        category: "trading",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "stop trading", "trading down", "disable trading", "shutdown trading",
            "trading stop",
        ],
        make_target: "trading-down",
        args: NO_ARGS,
        confirm: false,
        description: "Stop trading services",
        category: "trading",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Common development tasks
    IntentMapping {
        patterns: &[
            "build", "compile", "build project", "compile code", "create build",
            "make build", "build the app", "compile application", "generate build",
        ],
        make_target: "build",
        args: NO_ARGS,
        confirm: false,
        description: "Build the project",
        category: "development",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "clean", "cleanup", "clean build", "remove build", "clean project",
            "clear cache", "reset build", "clean everything", "fresh start",
        ],
        make_target: "clean",
        args: NO_ARGS,
        confirm: false,
        description: "Clean build artifacts and temporary files",
        category: "development",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "install", "install dependencies", "npm install", "install packages",
            "setup dependencies", "get dependencies", "install requirements",
        ],
        make_target: "install",
        args: NO_ARGS,
        confirm: false,
        description: "Install project dependencies",
        category: "development",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "generate", "create crud", "generate crud", "create model", "scaffold",
            "generate code", "create component", "generate service", "make crud",
        ],
        make_target: "generate-crud",
        args: NO_ARGS,
        confirm: false,
        description: "Generate CRUD operations for a model",
        category: "development",
        prerequisites: &["Model must exist in Prisma schema"],
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "logs", "show logs", "view logs", "check logs", "see logs",
            "dev logs", "development logs", "container logs", "service logs",
        ],
        make_target: "dev-logs",
        args: NO_ARGS,
        confirm: false,
        description: "View development service logs",
        category: "development",
        prerequisites: NONE,
        follow_up: NONE,
    },
    IntentMapping {
        patterns: &[
            "problems", "issues", "errors", "what's wrong", "debug", "troubleshoot",
            "not working", "broken", "fix", "help", "something wrong",
        ],
        make_target: "dev-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check status to identify problems",
        category: "development",
        prerequisites: NONE,
        follow_up: &["dev-logs", "health"],
    },
    // Database, advanced
    IntentMapping {
        patterns: &[
            "create migration", "new migration", "add migration", "make migration",
            "database change", "schema change", "alter database", "modify schema",
        ],
        make_target: "db-migrate-create",
        args: &[("NAME", "new_migration")],
        confirm: false,
        description: "Create a new database migration",
        category: "database",
        prerequisites: &["NAME parameter required"],
        follow_up: &["db-migrate"],
    },
    IntentMapping {
        patterns: &[
            "prisma studio", "database ui", "db studio", "visual database",
            "database browser", "explore database", "db ui", "database viewer",
        ],
        make_target: "db-studio",
        args: NO_ARGS,
        confirm: false,
        description: "Open Prisma Studio for visual database exploration",
        category: "database",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Deployment
    IntentMapping {
        patterns: &[
            "deploy", "deploy to production", "production deploy", "release",
            "push to production", "go live", "ship it", "deploy app",
        ],
        make_target: "deploy",
        args: NO_ARGS,
        confirm: true,
        description: "Deploy to production",
        category: "deployment",
        prerequisites: &["Tests must pass", "Build must succeed"],
        follow_up: &["health"],
    },
    // MCP bridge
    IntentMapping {
        patterns: &[
            "deploy mcp", "mcp deploy", "start mcp bridge", "deploy mcp bridge",
            "launch mcp", "mcp up", "start mcp server",
        ],
        make_target: "mcp-deploy",
        args: NO_ARGS,
        confirm: false,
        description: "Deploy MCP bridge server",
        category: "mcp",
        prerequisites: NONE,
        follow_up: &["mcp-status"],
    },
    IntentMapping {
        patterns: &[
            "mcp status", "check mcp", "mcp health", "mcp server status",
            "bridge status", "mcp bridge status",
        ],
        make_target: "mcp-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check MCP bridge server status",
        category: "mcp",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Frontend build
    IntentMapping {
        patterns: &[
            "build application", "run build", "build frontend", "compile frontend",
        ],
        make_target: "build-frontend",
        args: NO_ARGS,
        confirm: false,
        description: "Build the frontend application",
        category: "build",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Authentication
    IntentMapping {
        patterns: &[
            "get auth token", "generate token", "authentication token", "auth token",
            "get token", "create auth token", "login token",
        ],
        make_target: "auth-token",
        args: NO_ARGS,
        confirm: false,
        description: "Generate authentication token for API access",
        category: "authentication",
        prerequisites: NONE,
        follow_up: NONE,
    },
    // Workflows
    IntentMapping {
        patterns: &[
            "work on database", "database development", "db work", "database features",
            "database changes", "work with database",
        ],
        make_target: "dev-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check development status before database work",
        category: "development",
        prerequisites: NONE,
        follow_up: &["db-migrate-status", "check-db"],
    },
    IntentMapping {
        patterns: &[
            "work on trading", "trading development", "trading features", "crypto work",
            "trading system", "work with trading", "develop trading features",
        ],
        make_target: "trading-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check trading system status",
        category: "trading",
        prerequisites: NONE,
        follow_up: &["dev-status"],
    },
    IntentMapping {
        patterns: &[
            "work on frontend", "ui development", "frontend work", "user interface",
            "frontend features", "ui work", "frontend development",
        ],
        make_target: "dev-status",
        args: NO_ARGS,
        confirm: false,
        description: "Check development status for frontend work",
        category: "development",
        prerequisites: NONE,
        follow_up: &["build-frontend"],
    },
    IntentMapping {
        patterns: &[
            "quality check", "code quality", "full validation",
            "validate everything", "quality assurance", "qa check", "complete validation",
        ],
        make_target: "test",
        args: NO_ARGS,
        confirm: false,
        description: "Run comprehensive quality validation",
        category: "testing",
        prerequisites: NONE,
        follow_up: &["typecheck", "lint", "health"],
    },
    IntentMapping {
        patterns: &[
            "prepare for deployment", "deployment prep", "pre deployment", "deploy prep",
            "ready for deployment", "deployment check", "validate for deployment",
        ],
        make_target: "health",
        args: NO_ARGS,
        confirm: false,
        description: "Comprehensive pre-deployment validation",
        category: "deployment",
        prerequisites: NONE,
        follow_up: &["test", "typecheck", "lint"],
    },
];
